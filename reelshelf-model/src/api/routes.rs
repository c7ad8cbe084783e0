macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

pub const HEALTH: &str = "/health";

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const LOGIN: &str = v1_path!("/auth/login");
    }

    pub mod books {
        pub const COLLECTION: &str = v1_path!("/books");
    }

    pub mod movies {
        pub const COLLECTION: &str = v1_path!("/movies");
    }

    pub mod profile {
        pub const ROOT: &str = v1_path!("/profile");
        pub const STATS: &str = v1_path!("/profile/stats");
        pub const SHARE: &str = v1_path!("/profile/share");
        pub const EXPORT: &str = v1_path!("/profile/export");
        pub const IMPORT: &str = v1_path!("/profile/import");
    }

    pub mod share {
        pub const IMAGE: &str = v1_path!("/share/{id}");
    }
}

pub mod utils {
    /// Substitute `{name}` in a route template.
    pub fn replace_param(template: &str, name: &str, value: &str) -> String {
        template.replace(&format!("{{{name}}}"), value)
    }
}
