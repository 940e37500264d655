//! Route table. `/v1/admin` is registered ahead of `/v1` since actix takes
//! the first scope whose prefix matches.

use actix_web::web;

use crate::server::controller::{
    auth, billing, bookings, customer, guests, housekeeping, inventory, reports, restaurant,
    rooms, staff, theme,
};
use crate::server::service::rooms::MAX_IMAGE_BYTES;

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES))
        .service(admin_scope())
        .service(public_scope());
}

fn admin_scope() -> actix_web::Scope {
    web::scope("/v1/admin")
        // fixed paths before /rooms/{id}
        .service(rooms::room_stats)
        .service(rooms::get_room_by_number)
        .service(rooms::list_rooms)
        .service(rooms::get_room)
        .service(rooms::create_room)
        .service(rooms::update_room)
        .service(rooms::update_room_status)
        .service(rooms::delete_room)
        .service(rooms::upload_room_image)
        .service(rooms::delete_room_image)
        .service(rooms::list_room_types)
        .service(rooms::get_room_type)
        .service(rooms::create_room_type)
        .service(rooms::update_room_type)
        .service(rooms::delete_room_type)
        .service(bookings::availability)
        .service(bookings::list_bookings)
        .service(bookings::get_booking)
        .service(bookings::create_booking)
        .service(bookings::update_booking)
        .service(bookings::update_booking_status)
        .service(bookings::delete_booking)
        .service(guests::list_prizes)
        .service(guests::spin_wheel)
        .service(guests::list_guests)
        .service(guests::get_guest)
        .service(guests::guest_history)
        .service(guests::create_guest)
        .service(guests::update_guest)
        .service(guests::delete_guest)
        .service(staff::list_departments)
        .service(staff::list_staff)
        .service(staff::get_staff)
        .service(staff::create_staff)
        .service(staff::update_staff)
        .service(staff::delete_staff)
        .service(staff::list_users)
        .service(staff::create_user)
        .service(staff::update_user)
        .service(housekeeping::list_tasks)
        .service(housekeeping::create_task)
        .service(housekeeping::update_task_status)
        .service(housekeeping::delete_task)
        .service(restaurant::list_menu)
        .service(restaurant::create_menu_item)
        .service(restaurant::list_tables)
        .service(restaurant::create_table)
        .service(restaurant::update_table_status)
        .service(restaurant::list_orders)
        .service(restaurant::create_order)
        .service(restaurant::update_order_status)
        .service(inventory::list_inventory)
        .service(inventory::add_inventory_item)
        .service(inventory::update_inventory_item)
        .service(inventory::delete_inventory_item)
        .service(billing::list_invoices)
        .service(billing::get_invoice)
        .service(billing::create_invoice)
        .service(billing::update_invoice)
        .service(billing::record_payment)
        .service(billing::record_refund)
        .service(reports::dashboard)
        .service(reports::revenue_report)
}

fn public_scope() -> actix_web::Scope {
    web::scope("/v1")
        .service(auth::register)
        .service(auth::sign_in)
        .service(auth::federated_sign_in)
        .service(auth::sign_out)
        .service(auth::me)
        .service(auth::change_password)
        .service(auth::request_password_reset)
        .service(theme::get_theme)
        .service(theme::set_theme)
        .service(theme::toggle_theme)
        .service(customer::browse_rooms)
        .service(customer::room_details)
        .service(customer::browse_room_types)
        .service(customer::room_type_details)
        .service(customer::image)
        .service(customer::my_bookings)
        .service(customer::my_booking)
        .service(customer::book_room)
        .service(customer::cancel_my_booking)
        .service(customer::my_profile)
        .service(customer::update_my_profile)
}
