use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use shared::{
    AuthResponse, BillFilter, BillingPeriod, BillListResponse, BillResponse, CreateTenantRequest,
    GenerateBillRequest, InitAdminRequest, LoginRequest, ReportResponse, TenantListResponse,
    TenantResponse, UpdateTenantRequest,
};
use tracing::info;

use crate::db::DbConnection;
use crate::domain::report_service::scope_label;
use crate::domain::{AuthService, BillingService, ExportService, ReportService, TenantService};
use crate::error::LedgerError;

/// Application state holding one instance of each domain service.
#[derive(Clone)]
pub struct AppState {
    pub tenant_service: TenantService,
    pub billing_service: BillingService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub auth_service: AuthService,
}

impl AppState {
    /// Wire every service to the same database connection.
    pub fn new(db: DbConnection) -> Self {
        Self {
            tenant_service: TenantService::new(db.clone()),
            billing_service: BillingService::new(db.clone()),
            report_service: ReportService::new(db.clone()),
            export_service: ExportService::new(db.clone()),
            auth_service: AuthService::new(db),
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        match &self {
            LedgerError::Validation(_) | LedgerError::InvalidReading { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            LedgerError::TenantNotFound(_) | LedgerError::BillNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            LedgerError::Persistence(e) => {
                // Surface a generic failure; the cause stays in the logs
                tracing::error!("Storage failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
            }
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/init", post(init_admin))
        .route("/auth/login", post(login))
        .route("/tenants", get(list_tenants).post(create_tenant))
        .route("/tenants/:id", get(get_tenant).put(update_tenant))
        .route("/bills", get(list_bills).post(generate_bill))
        .route("/bills/unpaid", get(list_unpaid_bills))
        .route("/bills/:id", get(get_bill))
        .route("/bills/:id/paid", post(mark_paid))
        .route("/reports", get(report))
        .route("/reports/export", get(export_csv));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}

/// Month/year filter as it arrives on the query string.
#[derive(Deserialize, Debug, Default)]
pub struct BillFilterQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl BillFilterQuery {
    fn into_filter(self) -> BillFilter {
        BillFilter {
            month: self.month,
            year: self.year,
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "app": "rent-ledger" }))
}

async fn init_admin(
    State(state): State<AppState>,
    Json(request): Json<InitAdminRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    info!("POST /api/auth/init - username: {}", request.username);

    let user = state
        .auth_service
        .bootstrap_admin(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            username: user.username,
            success_message: "Admin user created. Please login.".to_string(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    info!("POST /api/auth/login - username: {}", request.username);

    let user = state
        .auth_service
        .verify_login(&request.username, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        username: user.username,
        success_message: "Welcome back!".to_string(),
    }))
}

async fn create_tenant(
    State(state): State<AppState>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    info!("POST /api/tenants - name: {}", request.name);

    let tenant = state.tenant_service.create_tenant(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(TenantResponse {
            tenant: tenant.to_dto(),
            success_message: "Tenant added.".to_string(),
        }),
    ))
}

async fn list_tenants(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, LedgerError> {
    let tenants = state.tenant_service.list_tenants().await?;
    Ok(Json(TenantListResponse {
        tenants: tenants.iter().map(|t| t.to_dto()).collect(),
    }))
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, LedgerError> {
    let tenant = state.tenant_service.get_tenant(id).await?;
    Ok(Json(tenant.to_dto()))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    info!("PUT /api/tenants/{}", id);

    let tenant = state.tenant_service.update_tenant(id, request).await?;
    Ok(Json(TenantResponse {
        tenant: tenant.to_dto(),
        success_message: "Tenant updated.".to_string(),
    }))
}

async fn generate_bill(
    State(state): State<AppState>,
    Json(request): Json<GenerateBillRequest>,
) -> Result<impl IntoResponse, LedgerError> {
    info!(
        "POST /api/bills - tenant: {}, end reading: {}",
        request.tenant_id, request.end_reading
    );

    // Absent period fields default to the current month
    let now = BillingPeriod::current();
    let period = BillingPeriod {
        month: request.month.unwrap_or(now.month),
        year: request.year.unwrap_or(now.year),
    };

    let bill = state
        .billing_service
        .generate_bill(request.tenant_id, request.end_reading, period)
        .await?;

    let success_message = format!(
        "Bill created: Units {}, Light {:.0}, Total {:.0}",
        bill.units, bill.light_bill, bill.total
    );
    Ok((
        StatusCode::CREATED,
        Json(BillResponse {
            bill: bill.to_dto(),
            success_message,
        }),
    ))
}

async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<BillFilterQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let filter = query.into_filter();
    let bills = state.billing_service.list_bills(&filter).await?;
    Ok(Json(BillListResponse {
        bills: bills.iter().map(|b| b.to_dto()).collect(),
    }))
}

async fn list_unpaid_bills(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, LedgerError> {
    let bills = state.billing_service.list_unpaid().await?;
    Ok(Json(BillListResponse {
        bills: bills.iter().map(|b| b.to_dto()).collect(),
    }))
}

async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, LedgerError> {
    let row = state.billing_service.get_bill(id).await?;
    Ok(Json(row.to_dto()))
}

async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, LedgerError> {
    info!("POST /api/bills/{}/paid", id);

    let bill = state.billing_service.mark_paid(id).await?;
    Ok(Json(BillResponse {
        bill: bill.to_dto(),
        success_message: "Marked as paid.".to_string(),
    }))
}

async fn report(
    State(state): State<AppState>,
    Query(query): Query<BillFilterQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let filter = query.into_filter();
    let (summary, rows) = state.report_service.aggregate_report(&filter).await?;
    Ok(Json(ReportResponse {
        scope: scope_label(&filter),
        summary,
        bills: rows.iter().map(|b| b.to_dto()).collect(),
    }))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<BillFilterQuery>,
) -> Result<impl IntoResponse, LedgerError> {
    let filter = query.into_filter();
    let export = state.export_service.export_csv(&filter).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", export.filename),
            ),
        ],
        export.content,
    ))
}
