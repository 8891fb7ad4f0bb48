pub mod moderation;
pub mod plagiarism;
pub mod recommendation;
pub mod signal_recorder;

pub use moderation::ModerationEngine;
pub use plagiarism::PlagiarismDetector;
pub use recommendation::RecommendationEngine;
pub use signal_recorder::SignalRecorder;
