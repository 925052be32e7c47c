mod writer;

pub use writer::{JobLogger, format_line};

/// Last path segment of a type name, without generic arguments.
///
/// `daemonctl_supervisor::cron::CronJob<app::Report>` becomes `CronJob`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("app::jobs::Mailer"), "Mailer");
        assert_eq!(
            short_type_name("daemonctl_supervisor::cron::CronJob<app::Report>"),
            "CronJob"
        );
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
