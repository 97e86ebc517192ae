//! Shared fixtures for unit tests: an in-memory SQLite database with the
//! schema applied, plus seeders for the rows most tests need.

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::models::admin::{AdminRole, Model as AdminModel};
use crate::models::guest::Model as GuestModel;
use crate::models::rfid_tag::Model as RfidTagModel;
use crate::models::room::Model as RoomModel;
use crate::repositories::admin::NewAdmin;
use crate::repositories::guest::NewGuest;
use crate::repositories::room::{NewRoom, Reservation};
use crate::repositories::{AdminRepository, GuestRepository, RfidTagRepository, RoomRepository};
use crate::stay::transitions::RfidTransition;

/// Placeholder PHC string for rows whose password is never checked.
pub const UNUSED_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$unused$unused";

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub async fn seed_guest(db: &DatabaseConnection, email: &str) -> GuestModel {
    let name = email.split('@').next().unwrap_or(email).to_string();
    GuestRepository::new(db)
        .create(NewGuest {
            name,
            email: email.to_string(),
            phone: "555-0100".to_string(),
            password_hash: UNUSED_PASSWORD_HASH.to_string(),
            membership_level: None,
        })
        .await
        .expect("seed guest")
}

pub async fn seed_admin(db: &DatabaseConnection, username: &str) -> AdminModel {
    AdminRepository::new(db)
        .create(NewAdmin {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: UNUSED_PASSWORD_HASH.to_string(),
            role: AdminRole::Admin,
        })
        .await
        .expect("seed admin")
}

/// Creates a room, reserved for `guest_id` when given.
pub async fn seed_room(
    db: &DatabaseConnection,
    room_number: &str,
    reservation: Option<(i32, f64)>,
) -> RoomModel {
    RoomRepository::new(db)
        .create(NewRoom {
            room_number: room_number.to_string(),
            reservation: reservation.map(|(guest_id, hours_stay)| Reservation {
                guest_id,
                hours_stay,
            }),
        })
        .await
        .expect("seed room")
}

/// Registers a tag and assigns it to `guest_id` when given.
pub async fn seed_tag(db: &DatabaseConnection, rfid_uid: &str, guest_id: Option<i32>) -> RfidTagModel {
    let repo = RfidTagRepository::new(db);
    let tag = repo.create(rfid_uid).await.expect("seed tag");
    match guest_id {
        Some(guest_id) => repo
            .apply(rfid_uid, RfidTransition::Assign, Some(guest_id))
            .await
            .expect("assign tag")
            .expect("tag was available"),
        None => tag,
    }
}
