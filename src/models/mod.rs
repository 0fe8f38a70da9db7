pub mod address;
pub mod cart;
pub mod checkout;
pub mod merchant;
pub mod order;

pub use address::Address;
pub use cart::{Cart, LineItem};
pub use checkout::{CheckoutSession, CheckoutSessionStatus};
pub use merchant::{Merchant, UcpConfig, UcpSettings};
pub use order::{Order, OrderStatus, PaymentSummary};
