mod config;
mod form;
mod template;
mod validation;

use std::collections::HashMap;
use std::io;

use actix_web::http::StatusCode;
use actix_web::{error, web};
use actix_web::{App, HttpResponse, HttpServer, Responder, Result};
use askama::Template;

use config::Config;
use form::user::Schemas;
use form::{FormController, SubmissionStatus};
use template::FormView;

fn render(template: impl Template, status: StatusCode) -> Result<HttpResponse> {
    let content = template.render().map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::build(status)
        .content_type("text/html")
        .body(content))
}

/// Response status for a form after a submit.
fn submission_status_code(status: SubmissionStatus) -> StatusCode {
    match status {
        SubmissionStatus::Idle => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionStatus::Failed => StatusCode::BAD_GATEWAY,
        SubmissionStatus::Succeeded => StatusCode::OK,
        // Handlers await the action before rendering, so a submitted form is
        // never still in flight here.
        SubmissionStatus::Submitting => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn login_ui(schemas: web::Data<Schemas>) -> Result<HttpResponse> {
    let controller = FormController::new(&schemas.login);
    let state = controller.into_state();

    render(
        template::user::LoginTemplate {
            form: FormView::new(&state),
        },
        StatusCode::OK,
    )
}

async fn login(
    schemas: web::Data<Schemas>,
    input: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse> {
    let mut controller = FormController::from_input(&schemas.login, &input);
    let status = controller
        .submit(form::user::log_login)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let state = controller.into_state();

    render(
        template::user::LoginTemplate {
            form: FormView::new(&state),
        },
        submission_status_code(status),
    )
}

async fn register_ui(schemas: web::Data<Schemas>) -> Result<HttpResponse> {
    let controller = FormController::new(&schemas.register);
    let state = controller.into_state();

    render(
        template::user::RegisterTemplate {
            form: FormView::new(&state),
        },
        StatusCode::OK,
    )
}

async fn register(
    schemas: web::Data<Schemas>,
    input: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse> {
    let mut controller = FormController::from_input(&schemas.register, &input);
    let status = controller
        .submit(form::user::log_registration)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let state = controller.into_state();

    render(
        template::user::RegisterTemplate {
            form: FormView::new(&state),
        },
        submission_status_code(status),
    )
}

async fn index() -> actix_web::Result<impl Responder> {
    render(template::IndexTemplate, StatusCode::OK)
}

async fn default_handler() -> Result<HttpResponse> {
    render(template::error::NotFoundErrorTemplate, StatusCode::NOT_FOUND)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .service(
            web::resource("/login")
                .route(web::get().to(login_ui))
                .route(web::post().to(login)),
        )
        .service(
            web::resource("/register")
                .route(web::get().to(register_ui))
                .route(web::post().to(register)),
        );
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let schemas = web::Data::new(
        Schemas::build().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
    );

    log::info!(
        "starting HTTP server at http://{}:{}",
        config.host,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(schemas.clone())
            .wrap(actix_web::middleware::Logger::default())
            .default_service(web::route().to(default_handler))
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?
    .workers(config.workers)
    .run()
    .await
}
