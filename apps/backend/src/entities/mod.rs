pub mod comments;
pub mod likes;
pub mod post_tags;
pub mod posts;
pub mod role_change_requests;
pub mod tags;
pub mod total_visit_counts;
pub mod users;
pub mod visit_logs;
