pub mod roles {

    pub const ADMIN: &str = "ROLE_ADMIN";

    pub const USER: &str = "ROLE_USER";
}

pub mod account {

    pub const DEFAULT_LANG_KEY: &str = "en";

    pub const LOGIN_MAX_LENGTH: usize = 50;

    pub const PASSWORD_MIN_LENGTH: usize = 4;

    pub const PASSWORD_MAX_LENGTH: usize = 100;
}

pub mod limits {

    pub const DEFAULT_PAGE_SIZE: u64 = 20;

    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Largest row offset a page may start at. SQLite binds offsets as `i64`.
    pub const MAX_ROW_OFFSET: u64 = i64::MAX.unsigned_abs();
}

pub mod session {

    /// Session key holding the authenticated login.
    pub const USER_KEY: &str = "user";
}

pub mod metric {

    pub const HTTP_REQUESTS: &str = "http_requests_total";

    pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";

    pub const ACCOUNT_REGISTRATIONS: &str = "account_registrations_total";

    pub const ACCOUNT_ACTIVATIONS: &str = "account_activations_total";

    pub const PASSWORD_RESETS_REQUESTED: &str = "password_resets_requested_total";

    pub const PASSWORD_RESETS_COMPLETED: &str = "password_resets_completed_total";

    pub const ACCOUNTS_PURGED: &str = "accounts_purged_total";

    pub const CLEANUP_RUNS: &str = "account_cleanup_runs_total";
}
