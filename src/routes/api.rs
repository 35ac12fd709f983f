//! `/api/v1` endpoints: resource lists, CSV exports and invoice notifications.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::exports::FsBlobStore;
use crate::models::config::ServerConfig;
use crate::notifications::{EmailRegistry, Mailer};
use crate::repository::DieselRepository;
use crate::routes::service_error_response;
use crate::services::invoices::EmailDispatch;
use crate::services::{
    activities as activities_service, customers as customers_service,
    exports as exports_service, invoices as invoices_service, jobs as jobs_service,
    payments as payments_service,
};

/// Registers every `/v1` endpoint; mounted under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_v1_customers)
        .service(api_v1_jobs)
        .service(api_v1_invoices)
        .service(api_v1_payments)
        .service(api_v1_activities)
        .service(api_v1_export)
        .service(api_v1_send_invoice)
        .service(api_v1_remind_invoice);
}

#[get("/v1/customers")]
pub async fn api_v1_customers(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers_service::list_customers(repo.get_ref(), &user, req.query_string()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list customers"),
    }
}

#[get("/v1/jobs")]
pub async fn api_v1_jobs(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match jobs_service::list_jobs(repo.get_ref(), &user, req.query_string()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list jobs"),
    }
}

#[get("/v1/invoices")]
pub async fn api_v1_invoices(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoices_service::list_invoices(repo.get_ref(), &user, req.query_string()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list invoices"),
    }
}

#[get("/v1/payments")]
pub async fn api_v1_payments(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match payments_service::list_payments(repo.get_ref(), &user, req.query_string()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list payments"),
    }
}

#[get("/v1/activities")]
pub async fn api_v1_activities(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match activities_service::list_activities(repo.get_ref(), &user, req.query_string()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => service_error_response(err, "list activities"),
    }
}

#[get("/v1/{resource}/export")]
pub async fn api_v1_export(
    req: HttpRequest,
    resource: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    store: web::Data<FsBlobStore>,
) -> impl Responder {
    let resource = resource.into_inner();
    match exports_service::export_resource(
        repo.get_ref(),
        store.get_ref(),
        &user,
        &resource,
        req.query_string(),
    ) {
        Ok(file) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file.file_name)],
            })
            .body(file.bytes),
        Err(err) => service_error_response(err, "export records"),
    }
}

#[post("/v1/invoices/{invoice_id}/send")]
pub async fn api_v1_send_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<EmailRegistry>,
    mailer: web::Data<dyn Mailer>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let dispatch = EmailDispatch {
        registry: registry.get_ref(),
        mailer: mailer.get_ref(),
        from: &server_config.mail_from,
    };

    match invoices_service::send_invoice(repo.get_ref(), &dispatch, &user, invoice_id.into_inner())
    {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => service_error_response(err, "send invoice"),
    }
}

#[post("/v1/invoices/{invoice_id}/remind")]
pub async fn api_v1_remind_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<EmailRegistry>,
    mailer: web::Data<dyn Mailer>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let dispatch = EmailDispatch {
        registry: registry.get_ref(),
        mailer: mailer.get_ref(),
        from: &server_config.mail_from,
    };

    match invoices_service::remind_invoice(
        repo.get_ref(),
        &dispatch,
        &user,
        invoice_id.into_inner(),
    ) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => service_error_response(err, "send payment reminder"),
    }
}
