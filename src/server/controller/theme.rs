use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::server::controller::error::ApiError;
use crate::server::controller::ok;
use crate::server::model::setting::Theme;
use crate::server::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ThemeBody {
    pub theme: Theme,
}

#[get("/theme")]
pub(crate) async fn get_theme(data: web::Data<AppState>) -> HttpResponse {
    ok(ThemeBody {
        theme: data.theme.get(),
    })
}

#[put("/theme")]
pub(crate) async fn set_theme(body: web::Json<ThemeBody>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let theme = data.theme.set(body.theme).await?;
    Ok(ok(ThemeBody { theme }))
}

#[post("/theme/toggle")]
pub(crate) async fn toggle_theme(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let theme = data.theme.toggle().await?;
    Ok(ok(ThemeBody { theme }))
}
