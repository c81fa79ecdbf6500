pub mod parsed_segment;
pub mod story_config;
pub mod story_session;
pub mod story_state;
