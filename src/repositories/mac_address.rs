//! # MAC Address Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::models::mac_address::{
    self, Entity as MacAddress, Model as MacAddressModel, STATUS_CONNECTED, STATUS_PENDING,
};

#[derive(Debug, Clone)]
pub struct NewMacAddress {
    pub mac: String,
    pub ip: Option<String>,
    pub guest_id: Option<i32>,
    pub rfid_uid: Option<String>,
    pub status: Option<String>,
}

pub struct MacAddressRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MacAddressRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewMacAddress) -> Result<MacAddressModel, DbErr> {
        mac_address::ActiveModel {
            mac: Set(new.mac),
            ip: Set(new.ip),
            guest_id: Set(new.guest_id),
            rfid_uid: Set(new.rfid_uid),
            status: Set(new.status.unwrap_or_else(|| STATUS_PENDING.to_string())),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Distinct MACs currently in the `connected` state.
    pub async fn list_whitelisted(&self) -> Result<Vec<String>, DbErr> {
        let rows = MacAddress::find()
            .filter(mac_address::Column::Status.eq(STATUS_CONNECTED))
            .order_by_asc(mac_address::Column::Id)
            .all(self.db)
            .await?;

        let mut macs: Vec<String> = Vec::with_capacity(rows.len());
        for row in rows {
            if !macs.contains(&row.mac) {
                macs.push(row.mac);
            }
        }
        Ok(macs)
    }

    /// Updates every row for `mac`, returning the updated rows.
    pub async fn update_status(
        &self,
        mac: &str,
        status: &str,
    ) -> Result<Vec<MacAddressModel>, DbErr> {
        MacAddress::update_many()
            .set(mac_address::ActiveModel {
                status: Set(status.to_string()),
                ..Default::default()
            })
            .filter(mac_address::Column::Mac.eq(mac))
            .exec(self.db)
            .await?;

        MacAddress::find()
            .filter(mac_address::Column::Mac.eq(mac))
            .order_by_asc(mac_address::Column::Id)
            .all(self.db)
            .await
    }
}
