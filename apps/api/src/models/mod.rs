pub mod collaboration;
pub mod company;
pub mod contact;
pub mod deal;
pub mod job;
pub mod outreach;
pub mod preferences;

pub use collaboration::{ClientInteraction, Comment, Task};
pub use company::Company;
pub use contact::Contact;
pub use deal::Deal;
pub use job::Job;
pub use outreach::{EmailSequence, Integration};
pub use preferences::Preferences;
