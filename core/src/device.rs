use std::fmt;

use anyhow::bail;

use crate::errors::ProbeResult;

/// A parsed TensorFlow device specification.
///
/// Accepts the full form (`/job:localhost/replica:0/task:0/device:GPU:1`), the
/// short `/device:CPU:0` form and the legacy lowercase `/cpu:0` / `/gpu:1`
/// forms. An empty string means "whatever the engine defaults to".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceSpec {
    pub job: Option<String>,
    pub replica: Option<usize>,
    pub task: Option<usize>,
    pub kind: Option<String>,
    pub index: Option<usize>,
}

impl DeviceSpec {
    pub fn parse(s: &str) -> ProbeResult<DeviceSpec> {
        let mut spec = DeviceSpec::default();
        if s.is_empty() {
            return Ok(spec);
        }
        let Some(body) = s.strip_prefix('/') else {
            bail!("Device spec {:?} must start with '/'", s)
        };
        for part in body.split('/') {
            let fields: Vec<&str> = part.split(':').collect();
            match fields.as_slice() {
                ["job", name] if !name.is_empty() => spec.job = Some(name.to_string()),
                ["replica", n] => spec.replica = Some(parse_index(s, n)?),
                ["task", n] => spec.task = Some(parse_index(s, n)?),
                ["device", kind, n] if !kind.is_empty() => {
                    spec.kind = Some(kind.to_uppercase());
                    spec.index = if *n == "*" { None } else { Some(parse_index(s, n)?) };
                }
                ["device", kind] if !kind.is_empty() => spec.kind = Some(kind.to_uppercase()),
                [kind, n] if kind.chars().all(|c| c.is_ascii_lowercase()) && !kind.is_empty() => {
                    spec.kind = Some(kind.to_uppercase());
                    spec.index = if *n == "*" { None } else { Some(parse_index(s, n)?) };
                }
                _ => bail!("Invalid device spec component {:?} in {:?}", part, s),
            }
        }
        Ok(spec)
    }

    pub fn is_cpu(&self) -> bool {
        self.kind.as_deref().map(|k| k == "CPU").unwrap_or(true)
    }
}

fn parse_index(spec: &str, n: &str) -> ProbeResult<usize> {
    n.parse().map_err(|_| anyhow::format_err!("Invalid index {:?} in device spec {:?}", n, spec))
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(job) = &self.job {
            write!(f, "/job:{job}")?;
        }
        if let Some(replica) = self.replica {
            write!(f, "/replica:{replica}")?;
        }
        if let Some(task) = self.task {
            write!(f, "/task:{task}")?;
        }
        if let Some(kind) = &self.kind {
            match self.index {
                Some(ix) => write!(f, "/device:{kind}:{ix}")?,
                None => write!(f, "/device:{kind}:*")?,
            }
        }
        Ok(())
    }
}
