//! Client-side topic request lifecycle: the request store, the controller
//! that drives it, and the transport seam to the explanation service.

pub mod controller;
pub mod error;
pub mod quiz;
pub mod store;
pub mod transport;
pub mod view;

pub use controller::{StalePolicy, SubmitOutcome, TopicController};
pub use error::{DecodeError, SubmitError, TransportError};
pub use quiz::{judge, Verdict};
pub use store::{Generation, ListenerId, RequestStatus, RequestStore, StoreSnapshot};
pub use transport::{decode_topic_result, explain_topic_endpoint, HttpTransport, TopicTransport};
pub use view::View;
