//! External collaborators: avatar images, conversational agents, payments.
//!
//! Each collaborator is a trait with an HTTP client and a local
//! implementation. The local implementations are deterministic and need no
//! credentials; they back development setups and serve as fallbacks when a
//! remote call fails or times out (see [`fallback`]).

pub mod conversation;
pub mod error;
pub mod fallback;
pub mod image;
pub mod payment;
pub mod signature;

pub use conversation::{AgentRefs, ConversationProvider, LocalResponder, Reply, StudioClient};
pub use error::ProviderError;
pub use image::{ImageProvider, PlaceholderImageProvider, StabilityClient};
pub use payment::{
    ChargeRequest, Checkout, LocalPaymentProvider, PaymentProvider, StripeClient, WebhookEvent,
};
