//! Price alerts: tell a farmer the latest price for a produce type by SMS.
//!
//! Only the calling user is alerted, and only when they are a farmer.
//! The user is re-read from the store so the contact number is current.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::notify::Notifier;
use crate::store::{Role, Store};

use super::dto::PriceAlert;

pub fn alert_text(alert: &PriceAlert) -> String {
    format!(
        "Agritech Alert: Latest market price for {} in {} is {} {}.",
        alert.produce_type, alert.region, alert.price, alert.unit
    )
}

/// Returns the email of the alerted user.
pub async fn send_price_alert(
    store: &dyn Store,
    notifier: &dyn Notifier,
    user_id: Uuid,
    alert: &PriceAlert,
) -> Result<String, AppError> {
    let farmer = match store.find_user_by_id(user_id).await? {
        Some(user) if user.user_type == Role::Farmer => user,
        _ => {
            warn!(%user_id, "price alert requested by a non-farmer");
            return Err(AppError::NotFound(
                "No relevant farmers found to send alert or not a farmer".into(),
            ));
        }
    };

    if !notifier
        .send_alert(&farmer.contact_number, &alert_text(alert))
        .await
    {
        error!(user_id = %farmer.id, "sms provider rejected price alert");
        return Err(AppError::Internal("Failed to send SMS alert".into()));
    }

    info!(user_id = %farmer.id, produce_type = %alert.produce_type, "price alert sent");
    Ok(farmer.email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use crate::store::{memory::InMemoryStore, NewUser};

    fn maize_alert() -> PriceAlert {
        PriceAlert {
            produce_type: "maize".into(),
            region: "Nakuru".into(),
            price: "45".into(),
            unit: "kg".into(),
        }
    }

    async fn user(store: &InMemoryStore, email: &str, role: Role) -> Uuid {
        store
            .insert_user(NewUser {
                email: email.into(),
                password_hash: "x".into(),
                user_type: role,
                contact_number: "+254711000000".into(),
                location: "Nakuru".into(),
                name: "Amina".into(),
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn text_echoes_the_price_as_sent() {
        assert_eq!(
            alert_text(&maize_alert()),
            "Agritech Alert: Latest market price for maize in Nakuru is 45 kg."
        );
    }

    #[tokio::test]
    async fn farmer_receives_the_text_on_their_number() {
        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new(true);
        let id = user(&store, "a@x.com", Role::Farmer).await;

        let email = send_price_alert(&store, &notifier, id, &maize_alert())
            .await
            .unwrap();
        assert_eq!(email, "a@x.com");
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+254711000000");
    }

    #[tokio::test]
    async fn buyers_and_unknown_users_get_not_found() {
        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new(true);
        let buyer = user(&store, "b@x.com", Role::Buyer).await;

        for id in [buyer, Uuid::new_v4()] {
            let err = send_price_alert(&store, &notifier, id, &maize_alert())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
        assert!(notifier.sent().is_empty());
    }
}
