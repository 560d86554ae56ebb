pub mod build_digest;
pub mod send_daily_digests;
