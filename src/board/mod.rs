//! Board subsystem — ordering and drag interaction.
//!
//! ## Typical gesture flow (drag a card)
//!
//! ```text
//! pick/hover/drop (raw ids)        new keys              write + rollback
//! ┌─────────────────────┐   ┌──────────────────┐   ┌───────────────────────┐
//! │ drag.rs             │──>│ order.rs         │──>│ sync::mutation        │
//! │ DragSession         │   │ move_within_list │   │ OptimisticController  │
//! │ → DropPlan          │   │ renormalize      │   │ apply()               │
//! └─────────────────────┘   └──────────────────┘   └───────────────────────┘
//!            ▲                        │                        │
//!            └──── engine.rs wires the three together ─────────┘
//! ```
//!
//! ## Module Map
//!
//! | Module   | Responsibility                                             |
//! |----------|------------------------------------------------------------|
//! | `models` | Shared types: `Job`, `BoardColumn`, `JobPatch`             |
//! | `order`  | Pure sort-key math and the fixed column sequence           |
//! | `store`  | `BoardStore` + `StoreHandle` (thin `Arc<Mutex<_>>`)        |
//! | `drag`   | Raw-id normalization and the drag state machine            |
//! | `engine` | `BoardEngine`: drop plans → ordered, persisted state       |

pub mod drag;
pub mod engine;
pub mod models;
pub mod order;
pub mod store;
