mod dispatcher;
mod render;

pub use dispatcher::{deactivate_recipient, deliver, DeliveryResult};
pub use render::{render_digest, render_reminder};
