mod collector;

pub use collector::CollectionTask;
