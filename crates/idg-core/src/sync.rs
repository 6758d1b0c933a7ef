//! Reconciling the diagram document with the tracker.
//!
//! A sync is two passes over one [`Snapshot`]:
//!
//! 1. graph → issues: annotate the diagram with links to existing issues and
//!    mark nodes whose issue is closed;
//! 2. issues → graph: create an issue for every node that has none.
//!
//! With dry-run enabled both passes compute their result but write nothing.

use crate::diagram::{self, Document};
use crate::error::{IdgError, Result};
use crate::graph::Graph;
use crate::reconcile::{self, LinkAnnotation};
use crate::tracker::{Issue, IssueTracker, Milestone, StateFilter};
use serde::Serialize;
use tracing::info;

pub const COMMIT_MESSAGE: &str = "Update issue dependency graph";

/// Where the diagram-bearing document lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiagramSource {
    /// The first open issue whose body contains a mermaid block.
    #[default]
    Issue,
    /// A Markdown file in the repository.
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentLocation {
    Issue { number: u64 },
    File { path: String, sha: String },
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The document and the tracker's issues, as read at the start of a run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Document,
    pub location: DocumentLocation,
    pub issues: Vec<Issue>,
    saved: String,
}

impl Snapshot {
    pub fn graph(&self) -> Graph {
        Graph::parse(&self.document.diagram_lines())
    }

    /// Whether the document differs from what was last read or written.
    pub fn is_dirty(&self) -> bool {
        self.document.render() != self.saved
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotateReport {
    pub class_def_inserted: bool,
    pub links: Vec<LinkAnnotation>,
    pub done: Vec<String>,
}

impl AnnotateReport {
    pub fn is_empty(&self) -> bool {
        !self.class_def_inserted && self.links.is_empty() && self.done.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub location: DocumentLocation,
    pub annotate: AnnotateReport,
    pub written: bool,
    pub created: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneReport {
    pub milestone: Milestone,
    pub issues: Vec<u64>,
}

// ---------------------------------------------------------------------------
// Syncer
// ---------------------------------------------------------------------------

pub struct Syncer<T> {
    tracker: T,
    source: DiagramSource,
    dry_run: bool,
}

impl<T: IssueTracker> Syncer<T> {
    pub fn new(tracker: T, source: DiagramSource) -> Self {
        Self {
            tracker,
            source,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// List every issue once and locate the diagram document.
    pub fn load(&self) -> Result<Snapshot> {
        let issues = self.tracker.list_issues(StateFilter::All)?;

        let (text, location) = match &self.source {
            DiagramSource::Issue => {
                let issue = issues
                    .iter()
                    .filter(|i| !i.is_closed())
                    .find(|i| i.body.as_deref().is_some_and(diagram::has_mermaid))
                    .ok_or(IdgError::NoDiagram)?;
                (
                    issue.body.clone().unwrap_or_default(),
                    DocumentLocation::Issue {
                        number: issue.number,
                    },
                )
            }
            DiagramSource::File(path) => {
                let file = self.tracker.get_file(path)?;
                (
                    file.content,
                    DocumentLocation::File {
                        path: file.path,
                        sha: file.sha,
                    },
                )
            }
        };

        let document = Document::parse(&text).ok_or_else(|| match &location {
            DocumentLocation::File { path, .. } => IdgError::NoDiagramInFile(path.clone()),
            DocumentLocation::Issue { .. } => IdgError::NoDiagram,
        })?;
        info!(?location, issues = issues.len(), "loaded diagram");

        Ok(Snapshot {
            saved: document.render(),
            document,
            location,
            issues,
        })
    }

    /// Graph → issues: add the `done` class definition, link unlinked nodes
    /// to their issues, and mark nodes whose issue is closed.
    pub fn annotate(&self, snapshot: &mut Snapshot) -> AnnotateReport {
        let mut report = AnnotateReport {
            class_def_inserted: snapshot.document.ensure_class_def(),
            ..AnnotateReport::default()
        };

        let graph = snapshot.graph();
        for link in reconcile::pending_links(&graph, &snapshot.issues) {
            info!(key = %link.key, url = %link.url, "linking node");
            snapshot.document.add_link(&link.key, &link.url);
            report.links.push(link);
        }
        for key in reconcile::closed_keys(&graph, &snapshot.issues) {
            // Styled already, possibly by a grouped `class A,B done` line.
            if graph.node(&key).is_some_and(|node| node.done) {
                continue;
            }
            if snapshot.document.mark_done(&key) {
                info!(%key, "marking node done");
                report.done.push(key);
            }
        }
        report
    }

    /// Write the document back when it changed. Returns whether it wrote.
    pub fn save(&self, snapshot: &mut Snapshot) -> Result<bool> {
        if !snapshot.is_dirty() {
            return Ok(false);
        }
        if self.dry_run {
            info!("dry run: diagram left unchanged");
            return Ok(false);
        }
        let text = snapshot.document.render();
        match &snapshot.location {
            DocumentLocation::Issue { number } => self.tracker.update_issue_body(*number, &text)?,
            DocumentLocation::File { path, sha } => {
                self.tracker.put_file(path, &text, sha, COMMIT_MESSAGE)?
            }
        }
        snapshot.saved = text;
        Ok(true)
    }

    /// Issues → graph: create an issue for every node title with none.
    /// Created issues join the snapshot so later passes see them.
    pub fn create_missing(&self, snapshot: &mut Snapshot) -> Result<Vec<String>> {
        let missing = reconcile::missing_issues(&snapshot.graph(), &snapshot.issues);
        for title in &missing {
            if self.dry_run {
                info!(%title, "dry run: would create issue");
                continue;
            }
            info!(%title, "creating issue");
            let issue = self.tracker.create_issue(title)?;
            snapshot.issues.push(issue);
        }
        Ok(missing)
    }

    /// Annotate the diagram, write it back, then create missing issues.
    pub fn sync(&self) -> Result<SyncReport> {
        let mut snapshot = self.load()?;
        let annotate = self.annotate(&mut snapshot);
        let written = self.save(&mut snapshot)?;
        let created = self.create_missing(&mut snapshot)?;
        Ok(SyncReport {
            location: snapshot.location,
            annotate,
            written,
            created,
        })
    }

    /// Assign a milestone to every graph issue that has none. Without a name
    /// the tracker's first open milestone is used.
    pub fn set_milestone(&self, name: Option<&str>) -> Result<MilestoneReport> {
        let milestones = self.tracker.list_milestones()?;
        let milestone = match name {
            None => milestones.into_iter().next().ok_or(IdgError::NoMilestones)?,
            Some(name) => milestones
                .into_iter()
                .find(|m| m.title == name)
                .ok_or_else(|| IdgError::MilestoneNotFound(name.to_string()))?,
        };

        let snapshot = self.load()?;
        let candidates = reconcile::milestone_candidates(&snapshot.graph(), &snapshot.issues);
        for &number in &candidates {
            if self.dry_run {
                info!(number, milestone = %milestone.title, "dry run: would set milestone");
                continue;
            }
            info!(number, milestone = %milestone.title, "setting milestone");
            self.tracker.set_issue_milestone(number, milestone.number)?;
        }
        Ok(MilestoneReport {
            milestone,
            issues: candidates,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
