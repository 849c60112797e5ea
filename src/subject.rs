pub mod cache_subject;
pub mod publish_subject;
pub mod replay_subject;

/// Something values can be pushed into.
pub trait Push {
    type Item;

    fn push(&self, value: Self::Item);
}
