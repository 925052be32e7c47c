use crate::{JobDescriptor, JobsConfig};

/// Jobs known to this installation, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Vec<JobDescriptor>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: JobsConfig) -> crate::Result<Self> {
        let mut registry = Self::new();
        registry.set_jobs(config.jobs)?;
        Ok(registry)
    }

    pub fn jobs(&self) -> &[JobDescriptor] {
        &self.jobs
    }

    pub fn add_job(&mut self, job: JobDescriptor) -> crate::Result<&mut Self> {
        if job.name.trim().is_empty() {
            return Err(crate::Error::Config("Job \"name\" must be given".to_string()));
        }
        if job.kind.trim().is_empty() {
            return Err(crate::Error::Config(format!(
                "Job '{}': \"type\" must be given",
                job.name
            )));
        }
        if self.get(&job.name).is_some() {
            return Err(crate::Error::Config(format!(
                "Job '{}' is registered twice",
                job.name
            )));
        }
        self.jobs.push(job);
        Ok(self)
    }

    /// Replace every registered job. On error the registry is left empty.
    pub fn set_jobs(&mut self, jobs: impl IntoIterator<Item = JobDescriptor>) -> crate::Result<&mut Self> {
        self.jobs.clear();
        let result = jobs
            .into_iter()
            .try_for_each(|job| self.add_job(job).map(|_| ()));
        if let Err(e) = result {
            self.jobs.clear();
            return Err(e);
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&JobDescriptor> {
        self.jobs.iter().find(|job| job.name == name)
    }

    pub fn get_or_err(&self, name: &str) -> crate::Result<&JobDescriptor> {
        self.get(name)
            .ok_or_else(|| crate::Error::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> JobDescriptor {
        JobDescriptor::new(name, "exec", format!("{name}.pid"), format!("{name}.status"))
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = JobRegistry::new();
        registry.add_job(job("mailer")).unwrap().add_job(job("indexer")).unwrap();

        assert_eq!(registry.jobs().len(), 2);
        assert_eq!(registry.get("indexer").unwrap().name, "indexer");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_get_or_err_unknown_name() {
        let registry = JobRegistry::new();
        let err = registry.get_or_err("ghost").unwrap_err();
        assert!(matches!(err, crate::Error::NotFound(ref name) if name == "ghost"));
    }

    #[test]
    fn test_add_requires_name_and_type() {
        let mut registry = JobRegistry::new();
        assert!(matches!(
            registry.add_job(job("")),
            Err(crate::Error::Config(_))
        ));

        let mut untyped = job("mailer");
        untyped.kind = String::new();
        assert!(matches!(
            registry.add_job(untyped),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = JobRegistry::new();
        registry.add_job(job("mailer")).unwrap();
        assert!(registry.add_job(job("mailer")).is_err());
    }

    #[test]
    fn test_set_jobs_replaces() {
        let mut registry = JobRegistry::new();
        registry.add_job(job("old")).unwrap();
        registry.set_jobs(vec![job("a"), job("b")]).unwrap();

        assert!(registry.get("old").is_none());
        assert_eq!(registry.jobs().len(), 2);

        assert!(registry.set_jobs(vec![job("c"), job("")]).is_err());
        assert!(registry.jobs().is_empty());
    }
}
