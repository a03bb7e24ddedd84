// Application state for HTTP handlers
use crate::application::polling_controller::ControllerHandle;
use crate::application::proxy_service::ProxyService;

#[derive(Clone)]
pub struct AppState {
    pub proxy: ProxyService,
    pub dashboard: ControllerHandle,
}
