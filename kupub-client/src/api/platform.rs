use shared::models::{
    CreateAdminRequest, CreateDepartmentRequest, Department, PlatformUser, UpdateAdminRequest,
    UpdateDepartmentRequest,
};

use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Super-admin endpoints (`/api/platform/...`)
#[derive(Debug, Clone)]
pub struct PlatformApi<C = NetworkHttpClient> {
    http: C,
}

impl<C: HttpClient> PlatformApi<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    // ========== Departments ==========

    pub async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        self.http.get("/api/platform/departments").await
    }

    pub async fn create_department(&self, req: &CreateDepartmentRequest) -> ClientResult<Department> {
        let dept: Department = self.http.post("/api/platform/departments", req).await?;
        tracing::info!(id = dept.id, slug = %dept.slug, "Department created");
        Ok(dept)
    }

    pub async fn update_department(
        &self,
        department_id: i64,
        req: &UpdateDepartmentRequest,
    ) -> ClientResult<Department> {
        self.http
            .patch(&format!("/api/platform/departments/{department_id}"), req)
            .await
    }

    pub async fn delete_department(&self, department_id: i64) -> ClientResult<()> {
        self.http
            .delete::<()>(&format!("/api/platform/departments/{department_id}"))
            .await?;
        tracing::info!(id = department_id, "Department deleted");
        Ok(())
    }

    // ========== Accounts ==========

    pub async fn list_users(&self) -> ClientResult<Vec<PlatformUser>> {
        self.http.get("/api/platform/users").await
    }

    pub async fn create_admin(&self, req: &CreateAdminRequest) -> ClientResult<PlatformUser> {
        let user: PlatformUser = self.http.post("/api/platform/users", req).await?;
        tracing::info!(id = user.id, username = %user.username, role = ?user.role, "Account created");
        Ok(user)
    }

    pub async fn update_admin(
        &self,
        user_id: i64,
        req: &UpdateAdminRequest,
    ) -> ClientResult<PlatformUser> {
        self.http
            .patch(&format!("/api/platform/users/{user_id}"), req)
            .await
    }

    pub async fn delete_admin(&self, user_id: i64) -> ClientResult<()> {
        self.http
            .delete::<()>(&format!("/api/platform/users/{user_id}"))
            .await?;
        tracing::info!(id = user_id, "Account deleted");
        Ok(())
    }
}
