use crate::server::controller::error::ApiError;
use crate::server::database::Store;
use crate::server::model::config::ServerConfig;
use crate::server::service::auth::AuthService;
use crate::server::service::billing::BillingService;
use crate::server::service::bookings::BookingService;
use crate::server::service::guests::GuestService;
use crate::server::service::housekeeping::HousekeepingService;
use crate::server::service::inventory::InventoryService;
use crate::server::service::reports::ReportService;
use crate::server::service::restaurant::RestaurantService;
use crate::server::service::rooms::RoomService;
use crate::server::service::staff::StaffService;
use crate::server::service::theme::ThemeStore;

/// Shared by every worker; all services are cheap handles over one [`Store`].
#[derive(Clone)]
pub(crate) struct AppState {
    pub rooms: RoomService,
    pub bookings: BookingService,
    pub guests: GuestService,
    pub staff: StaffService,
    pub housekeeping: HousekeepingService,
    pub restaurant: RestaurantService,
    pub inventory: InventoryService,
    pub billing: BillingService,
    pub reports: ReportService,
    pub auth: AuthService,
    pub theme: ThemeStore,
}

impl AppState {
    pub async fn new(store: &Store, config: &ServerConfig) -> Result<Self, ApiError> {
        Ok(Self {
            rooms: RoomService::new(store),
            bookings: BookingService::new(store),
            guests: GuestService::new(store),
            staff: StaffService::new(store),
            housekeeping: HousekeepingService::new(store),
            restaurant: RestaurantService::new(store),
            inventory: InventoryService::new(store),
            billing: BillingService::new(store),
            reports: ReportService::new(store),
            auth: AuthService::new(store, config.auth.clone()),
            theme: ThemeStore::load(store, config.default_theme).await?,
        })
    }
}
