//! State handlers: what happens while a walk is in a state.
//!
//! Handlers produce at most one event per visit and never choose the next
//! state; leaving a state is the walk's job.

use crate::error::HandlerError;
use crate::session::Session;
use async_trait::async_trait;
use datagen_core::{Event, State};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

const BROWSING_PAGES: &[&str] = &["home", "search", "product", "cart", "checkout"];
const PRODUCT_REFERRERS: &[&str] = &["home", "search", "recommendation"];

/// Everything a handler may read or draw from during one visit.
pub struct HandlerContext<'a> {
    pub state: State,
    /// Correlation id of the walk; tags every event it produces.
    pub correlation_id: Uuid,
    pub session: &'a Session,
    pub rng: &'a mut StdRng,
}

impl HandlerContext<'_> {
    /// A fresh event for the current state, carrying the session identity.
    ///
    /// Event ids are random even under a fixed seed, so repeated runs add rows
    /// instead of overwriting earlier ones.
    pub fn event(&mut self) -> Event {
        Event::new(
            Uuid::new_v4(),
            self.state.event_type(),
            self.correlation_id,
            &self.session.identity,
        )
    }
}

/// Side-effect producer bound to a state in the transition table.
#[async_trait]
pub trait StateHandler: Send + Sync {
    /// Handle one visit. Returning an error aborts the current walk.
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError>;
}

/// Emits an event carrying only identity and timestamp.
///
/// Used for Entry, Authenticated, AddToCart, RemoveFromCart, Unauthenticated and Terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEventHandler;

#[async_trait]
impl StateHandler for IdentityEventHandler {
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        Ok(Some(ctx.event()))
    }
}

/// Emits nothing. Bound to Terminal when a table does not provide its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl StateHandler for NoopHandler {
    async fn handle(&self, _ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        Ok(None)
    }
}

/// Page view with scroll depth and dwell time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowsingHandler;

#[async_trait]
impl StateHandler for BrowsingHandler {
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        let page = BROWSING_PAGES[ctx.rng.gen_range(0..BROWSING_PAGES.len())];
        // Two decimals, like a client-side scroll tracker reports it.
        let scroll_depth = f64::from(ctx.rng.gen_range(0u32..=100)) / 100.0;
        let duration_ms = ctx.rng.gen_range(0u32..=4_000);

        let event = ctx
            .event()
            .with_field("page", page)
            .with_field("scroll_depth", scroll_depth)
            .with_field("duration_ms", duration_ms);
        Ok(Some(event))
    }
}

/// View of one product from the session's sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewProductHandler;

#[async_trait]
impl StateHandler for ViewProductHandler {
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        let session = ctx.session;
        let product = session
            .products
            .choose(&mut *ctx.rng)
            .ok_or_else(|| HandlerError::new(ctx.state, "session product sample is empty"))?;
        let referrer = PRODUCT_REFERRERS[ctx.rng.gen_range(0..PRODUCT_REFERRERS.len())];
        let duration_ms = ctx.rng.gen_range(1_000u32..=30_000);

        let event = ctx
            .event()
            .with_field("product_id", product.id.to_string())
            .with_field("main_category", product.main_category.clone())
            .with_field("sub_category", product.sub_category.clone())
            .with_field("referrer", referrer)
            .with_field("duration_ms", duration_ms);
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_core::{EventType, Identity, Product};
    use rand::SeedableRng;

    fn session(products: Vec<Product>) -> Session {
        Session {
            id: 0,
            identity: Identity {
                user_id: Uuid::nil(),
                username: "shopper".to_string(),
                ip_address: "198.51.100.1".to_string(),
                user_agent: "Mozilla/5.0".to_string(),
            },
            products,
        }
    }

    fn product() -> Product {
        Product {
            id: Uuid::from_u128(11),
            name: "Acme Pro Yoga Mat".to_string(),
            main_category: "sports & fitness".to_string(),
            sub_category: "Yoga".to_string(),
            price: Some(999.0),
        }
    }

    async fn visit(handler: &dyn StateHandler, state: State, session: &Session) -> Event {
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = HandlerContext {
            state,
            correlation_id: Uuid::from_u128(99),
            session,
            rng: &mut rng,
        };
        handler.handle(&mut ctx).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_identity_event_uses_state_event_type() {
        let session = session(vec![]);
        let event = visit(&IdentityEventHandler, State::Unauthenticated, &session).await;

        assert_eq!(event.event_type, EventType::Logout);
        assert_eq!(event.context_id, Uuid::from_u128(99));
        assert_eq!(event.user_name, "shopper");
        assert!(event.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_browsing_metadata_ranges() {
        let session = session(vec![]);
        let event = visit(&BrowsingHandler, State::Browsing, &session).await;

        let page = event.metadata["page"].as_str().unwrap();
        assert!(BROWSING_PAGES.contains(&page));
        let depth = event.metadata["scroll_depth"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&depth));
        let duration = event.metadata["duration_ms"].as_u64().unwrap();
        assert!(duration <= 4_000);
    }

    #[tokio::test]
    async fn test_view_product_metadata() {
        let session = session(vec![product()]);
        let event = visit(&ViewProductHandler, State::ViewProduct, &session).await;

        assert_eq!(event.event_type, EventType::ViewProduct);
        assert_eq!(
            event.metadata["product_id"],
            Uuid::from_u128(11).to_string()
        );
        assert_eq!(event.metadata["main_category"], "sports & fitness");
        assert_eq!(event.metadata["sub_category"], "Yoga");
        let duration = event.metadata["duration_ms"].as_u64().unwrap();
        assert!((1_000..=30_000).contains(&duration));
    }

    #[tokio::test]
    async fn test_view_product_without_sample_fails() {
        let session = session(vec![]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = HandlerContext {
            state: State::ViewProduct,
            correlation_id: Uuid::nil(),
            session: &session,
            rng: &mut rng,
        };

        let err = ViewProductHandler.handle(&mut ctx).await.unwrap_err();
        assert_eq!(err.state, State::ViewProduct);
    }

    #[tokio::test]
    async fn test_noop_emits_nothing() {
        let session = session(vec![]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut ctx = HandlerContext {
            state: State::Terminal,
            correlation_id: Uuid::nil(),
            session: &session,
            rng: &mut rng,
        };

        assert!(NoopHandler.handle(&mut ctx).await.unwrap().is_none());
    }
}
