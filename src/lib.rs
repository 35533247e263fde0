// modules tree
pub mod build_info;
pub mod docs;
pub mod proto;
pub mod domain {
    pub mod vote;
}
pub mod dto {
    pub mod responses {
        pub mod response_data;
        pub mod response_meta;
    }
}
pub mod errors {
    pub mod code_error;
}
pub mod handlers {
    pub mod server {
        pub mod fallback;
        pub mod healthcheck;
        pub mod root;
    }
    pub mod voting {
        pub mod vote;
    }
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod catch_panic;
        pub mod logging;
    }
}
pub mod init {
    pub mod config;
    pub mod endpoint;
    pub mod logger;
    pub mod server_init;
    pub mod state;
}
pub mod client {
    pub mod voting_client;
}
pub mod util {
    pub mod time {
        pub mod duration_formatter;
        pub mod now;
    }
}
