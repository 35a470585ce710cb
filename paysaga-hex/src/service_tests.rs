//! PaymentService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use paysaga_gateway::{GatewayCall, GatewayOperation, InMemoryGateway};
    use paysaga_store::MemoryStore;
    use paysaga_types::{
        AppError, CreateIntentRequest, CreatePaymentRequest, Currency, IntentStatus, Money,
        PaymentGateway, PaymentIntentId, RefundPaymentRequest, StateStore, StoreError,
        WebhookEvent,
    };

    use crate::PaymentService;

    /// Store whose backend is always down.
    pub struct BrokenStore;

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn del(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn is_connected(&self) -> bool {
            false
        }
    }

    fn setup() -> (
        PaymentService<InMemoryGateway, MemoryStore>,
        InMemoryGateway,
        Arc<MemoryStore>,
    ) {
        let gateway = InMemoryGateway::new();
        let store = Arc::new(MemoryStore::new());
        let service = PaymentService::new(Arc::new(gateway.clone()), store.clone());
        (service, gateway, store)
    }

    fn create_req(amount: f64, currency: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount: Some(amount),
            currency: Some(currency.into()),
        }
    }

    fn retrievals(gateway: &InMemoryGateway) -> usize {
        gateway
            .calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::RetrieveIntent(_)))
            .count()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // create_payment
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_payment_success() {
        let (service, _gateway, store) = setup();

        let intent = service.create_payment(create_req(10.5, "usd")).await.unwrap();

        assert_eq!(intent.amount, 1050);
        assert_eq!(intent.status, IntentStatus::RequiresConfirmation);
        assert!(intent.client_secret.is_some());
        // The compensation pointer is kept for its TTL.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_payment_validation() {
        let (service, gateway, _store) = setup();

        let cases = [
            (
                CreatePaymentRequest {
                    amount: None,
                    currency: Some("USD".into()),
                },
                "Amount is required",
            ),
            (create_req(0.0, "USD"), "Amount must be greater than 0"),
            (create_req(-5.0, "USD"), "Amount must be greater than 0"),
            (
                CreatePaymentRequest {
                    amount: Some(10.0),
                    currency: None,
                },
                "Currency is required",
            ),
            (
                create_req(10.0, "JPY"),
                "Currency must be one of: USD, EUR, GBP (got JPY)",
            ),
        ];

        for (req, expected) in cases {
            let result = service.create_payment(req).await;
            assert!(
                matches!(&result, Err(AppError::BadRequest(msg)) if msg == expected),
                "expected {expected:?}, got {result:?}"
            );
        }
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_payment_gateway_failure() {
        let (service, gateway, store) = setup();
        gateway.fail_on(GatewayOperation::CreateIntent, "Your card was declined.");

        let result = service.create_payment(create_req(10.0, "EUR")).await;

        assert!(matches!(
            result,
            Err(AppError::PaymentFailed(msg)) if msg == "Transaction failed: Your card was declined."
        ));
        assert!(store.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // confirm_payment
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_confirm_payment_success() {
        let (service, _gateway, _store) = setup();
        let created = service.create_payment(create_req(20.0, "GBP")).await.unwrap();

        let confirmed = service.confirm_payment(created.id.as_str()).await.unwrap();

        assert_eq!(confirmed.id, created.id);
        assert_eq!(confirmed.status, IntentStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_failed_confirm_tries_refund_then_cancel() {
        let (service, gateway, _store) = setup();
        let created = service.create_payment(create_req(20.0, "USD")).await.unwrap();
        gateway.fail_on(GatewayOperation::ConfirmIntent, "Card declined");

        let result = service.confirm_payment(created.id.as_str()).await;

        assert!(matches!(result, Err(AppError::PaymentFailed(msg)) if msg.contains("Card declined")));
        let calls = gateway.calls();
        assert_eq!(
            &calls[1..],
            &[
                GatewayCall::ConfirmIntent(created.id.clone()),
                GatewayCall::CreateRefund(created.id.clone()),
                GatewayCall::CancelIntent(created.id.clone()),
            ]
        );
        assert_eq!(
            gateway.intent(&created.id).unwrap().status,
            IntentStatus::Canceled
        );
    }

    #[tokio::test]
    async fn test_confirm_rejects_blank_id() {
        let (service, gateway, _store) = setup();

        let result = service.confirm_payment("  ").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(gateway.calls().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // get_payment_status
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_status_is_served_from_cache() {
        let (service, gateway, _store) = setup();
        let created = service.create_payment(create_req(10.0, "USD")).await.unwrap();

        let first = service.get_payment_status(created.id.as_str()).await.unwrap();
        let second = service.get_payment_status(created.id.as_str()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(retrievals(&gateway), 1);
    }

    #[tokio::test]
    async fn test_confirm_invalidates_cached_status() {
        let (service, gateway, _store) = setup();
        let created = service.create_payment(create_req(10.0, "USD")).await.unwrap();
        service.get_payment_status(created.id.as_str()).await.unwrap();

        service.confirm_payment(created.id.as_str()).await.unwrap();
        let status = service.get_payment_status(created.id.as_str()).await.unwrap();

        assert_eq!(status.status, IntentStatus::Succeeded);
        assert_eq!(retrievals(&gateway), 2);
    }

    #[tokio::test]
    async fn test_status_of_unknown_intent_is_not_found() {
        let (service, _gateway, _store) = setup();

        let result = service.get_payment_status("pi_missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_status_survives_store_outage() {
        let gateway = InMemoryGateway::new();
        let service = PaymentService::new(Arc::new(gateway.clone()), Arc::new(BrokenStore));
        let created = gateway
            .create_intent(CreateIntentRequest::unconfirmed(
                Money::from_minor(1000, Currency::USD).unwrap(),
            ))
            .await
            .unwrap();

        let status = service.get_payment_status(created.id.as_str()).await.unwrap();

        assert_eq!(status.id, created.id);
        assert!(!service.store_connected().await);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // refund_payment
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_partial_refund_converts_to_minor_units() {
        let (service, _gateway, _store) = setup();
        let created = service.create_payment(create_req(10.0, "USD")).await.unwrap();
        service.confirm_payment(created.id.as_str()).await.unwrap();

        let refund = service
            .refund_payment(
                created.id.as_str(),
                RefundPaymentRequest {
                    amount: Some(2.5),
                    reason: Some("requested_by_customer".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(refund.amount, 250);
        assert_eq!(refund.payment_intent, Some(created.id));
    }

    #[tokio::test]
    async fn test_refund_rejects_non_positive_amount() {
        let (service, gateway, _store) = setup();

        let result = service
            .refund_payment(
                "pi_0001",
                RefundPaymentRequest {
                    amount: Some(-1.0),
                    reason: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(gateway.refunds().is_empty());
    }

    #[tokio::test]
    async fn test_refund_of_unconfirmed_intent_is_bad_request() {
        let (service, _gateway, _store) = setup();
        let created = service.create_payment(create_req(10.0, "USD")).await.unwrap();

        let result = service
            .refund_payment(created.id.as_str(), RefundPaymentRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // webhooks
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_webhook_event_invalidates_cached_status() {
        let (service, gateway, _store) = setup();
        let created = service.create_payment(create_req(10.0, "USD")).await.unwrap();
        service.get_payment_status(created.id.as_str()).await.unwrap();

        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": created.id.as_str(), "amount": 1000 } }
        }))
        .unwrap();
        service.handle_webhook_event(&event).await;
        service.get_payment_status(created.id.as_str()).await.unwrap();

        assert_eq!(retrievals(&gateway), 2);
    }

    #[tokio::test]
    async fn test_unhandled_webhook_event_is_accepted() {
        let (service, gateway, _store) = setup();
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_2",
            "type": "customer.created",
            "data": { "object": { "id": "cus_1" } }
        }))
        .unwrap();

        service.handle_webhook_event(&event).await;

        assert!(gateway.calls().is_empty());
        assert_eq!(event.payment_intent_id(), None::<PaymentIntentId>);
    }
}
