pub mod comments;
pub mod likes;
pub mod posts;
pub mod tags;
pub mod users;
pub mod visits;
