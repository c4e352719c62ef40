//! 自定义域名绑定
//!
//! 状态：`Unset → Pending → Verified`，域名改变时 `Verified → Pending`。

pub mod control_plane;
pub mod models;
pub mod normalize;
pub mod repository;
pub mod service;

pub use control_plane::{DomainControlPlane, HttpControlPlane};
pub use models::{DnsCheck, DomainBinding, DomainEvent, DomainOpResult, DomainStatus};
pub use normalize::normalize_domain;
pub use repository::{DomainRepository, MemoryDomainRepository};
pub use service::DomainBindingService;
