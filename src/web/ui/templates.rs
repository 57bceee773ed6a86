use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub record_count: u64,
    pub collector_mode: String,
    pub inserted: u64,
    pub failures: u64,
    pub interval: String,
    pub last_error: String,
}
