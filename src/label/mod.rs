pub mod labeler;

pub use labeler::Labeler;
