//! Step and attachment recording for one test case.
//!
//! A [`Report`] is a cheap handle; every clone records into the same test
//! case. Finished cases are written as `<uuid>-result.json` next to their
//! attachment files, the layout Allure-style report renderers read.

use crate::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a test case or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    /// An assertion did not hold.
    Failed,
    /// The case could not run to its assertion (transport, browser, config).
    Broken,
}

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDetails {
    pub message: String,
}

/// A file attached to a step or test case.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub name: String,
    /// File name of the content, relative to the results directory.
    pub source: String,
    #[serde(rename = "type")]
    pub mime: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: String,
    pub start: i64,
    pub stop: Option<i64>,
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
}

impl StepRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            status: None,
            status_details: None,
            stage: "running".into(),
            start: now_millis(),
            stop: None,
            steps: Vec::new(),
            attachments: Vec::new(),
        }
    }

    fn close(&mut self, status: Status, message: Option<String>) {
        self.status = Some(status);
        self.status_details = message.map(|message| StatusDetails { message });
        self.stage = "finished".into();
        self.stop = Some(now_millis());
    }
}

/// Serialized form of a finished test case.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub uuid: String,
    pub history_id: String,
    pub name: String,
    pub full_name: String,
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: String,
    pub start: i64,
    pub stop: Option<i64>,
    pub labels: Vec<Label>,
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug)]
struct Inner {
    case: TestCaseRecord,
    /// Steps currently running, outermost first.
    open: Vec<StepRecord>,
}

impl Inner {
    fn attachments(&mut self) -> &mut Vec<Attachment> {
        match self.open.last_mut() {
            Some(step) => &mut step.attachments,
            None => &mut self.case.attachments,
        }
    }

    fn close_step(&mut self, status: Status, message: Option<String>) {
        let Some(mut step) = self.open.pop() else {
            return;
        };
        step.close(status, message);
        match self.open.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.case.steps.push(step),
        }
    }
}

/// Records the steps of one test case.
#[derive(Debug, Clone)]
pub struct Report {
    inner: Arc<Mutex<Inner>>,
}

impl Report {
    /// Start recording a test case.
    pub fn start(feature: &str, story: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let full_name = format!("{} / {} / {}", feature, story, name);
        info!("test case: {}", full_name);
        let case = TestCaseRecord {
            uuid: Uuid::new_v4().to_string(),
            history_id: full_name.clone(),
            name,
            full_name,
            status: None,
            status_details: None,
            stage: "running".into(),
            start: now_millis(),
            stop: None,
            labels: vec![
                Label {
                    name: "feature".into(),
                    value: feature.into(),
                },
                Label {
                    name: "story".into(),
                    value: story.into(),
                },
            ],
            steps: Vec::new(),
            attachments: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(Inner {
                case,
                open: Vec::new(),
            })),
        }
    }

    /// Run `body` as a named step, recording whether it succeeded.
    ///
    /// Steps opened while `body` runs are nested under this one.
    pub async fn step<T, F>(&self, name: impl Into<String>, body: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let name = name.into();
        debug!("step: {}", name);
        self.inner.lock().open.push(StepRecord::new(name));

        let result = body.await;

        let (status, message) = match &result {
            Ok(_) => (Status::Passed, None),
            Err(e) => (Status::Failed, Some(e.to_string())),
        };
        self.inner.lock().close_step(status, message);
        result
    }

    /// Attach plain text to the running step (or the test case).
    pub fn attach_text(&self, name: impl Into<String>, text: impl Into<String>) {
        self.attach_bytes(name, "text/plain", text.into().into_bytes());
    }

    /// Attach raw content to the running step (or the test case).
    pub fn attach_bytes(&self, name: impl Into<String>, mime: &str, content: impl Into<Vec<u8>>) {
        let attachment = Attachment {
            name: name.into(),
            source: format!("{}-attachment.{}", Uuid::new_v4(), extension(mime)),
            mime: mime.to_string(),
            content: content.into(),
        };
        debug!("attach: {} ({})", attachment.name, attachment.mime);
        self.inner.lock().attachments().push(attachment);
    }

    /// Stamp the final status. Steps still open are closed as broken.
    pub fn finish(&self, status: Status, message: Option<String>) {
        let mut inner = self.inner.lock();
        while !inner.open.is_empty() {
            inner.close_step(Status::Broken, None);
        }
        let case = &mut inner.case;
        case.status = Some(status);
        case.status_details = message.map(|message| StatusDetails { message });
        case.stage = "finished".into();
        case.stop = Some(now_millis());
        info!("{}: {:?}", case.full_name, status);
    }

    /// Snapshot of the recorded test case.
    pub fn snapshot(&self) -> TestCaseRecord {
        self.inner.lock().case.clone()
    }

    /// Write the result file and attachments into `dir`.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let case = self.snapshot();
        for attachment in collect_attachments(&case) {
            std::fs::write(dir.join(&attachment.source), &attachment.content)?;
        }

        let path = dir.join(format!("{}-result.json", case.uuid));
        std::fs::write(&path, serde_json::to_vec_pretty(&case)?)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

fn collect_attachments(case: &TestCaseRecord) -> Vec<&Attachment> {
    fn walk<'a>(steps: &'a [StepRecord], out: &mut Vec<&'a Attachment>) {
        for step in steps {
            out.extend(step.attachments.iter());
            walk(&step.steps, out);
        }
    }
    let mut out: Vec<&Attachment> = case.attachments.iter().collect();
    walk(&case.steps, &mut out);
    out
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "text/plain" => "txt",
        "text/html" => "html",
        "application/json" => "json",
        "image/png" => "png",
        _ => "bin",
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
