//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod console_rx;
pub mod console_tx;
pub mod gateway;
pub mod power;
pub mod tick;

pub use console_rx::console_rx_task;
pub use console_tx::console_tx_task;
pub use gateway::gateway_task;
pub use power::power_task;
pub use tick::tick_task;
