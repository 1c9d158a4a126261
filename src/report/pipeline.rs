use crate::config::Settings;
use crate::provider::ToolSpec;
use crate::report::build_job::{compose, BuildJob, ExtraPackages};
use crate::report::document::{write_document, SourceDocument};
use crate::report::publish::{PublishedOutput, ResultPathPublisher};
use crate::report::renderer::{ContainerRenderer, RenderResult, RenderStatus};
use crate::report::slot::{OutputSlot, SlotAllocator};
use crate::report::{ReportError, ToolInvocation};
use crate::shared::logging::LogSink;
use serde_json::json;

pub const REPORT_TOOL_NAME: &str = "report_answer";

const REPORT_TOOL_DESCRIPTION: &str = "Reports an answer as a Quarto markdown document. \
The filename is a five-word summary of the question, separated by dashes, with the extension .qmd. \
The answer is the complete Quarto document: a metadata block with author and date, the original \
question, an overview, any requested code in fenced blocks whose language is in curly braces \
(for example ```{python} or ```{r}), and an explanation. Returns true when the document was saved.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    SlotAllocated,
    DocumentWritten,
    JobComposed,
    Rendered,
    Published,
    Done,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::SlotAllocated => "slot_allocated",
            Self::DocumentWritten => "document_written",
            Self::JobComposed => "job_composed",
            Self::Rendered => "rendered",
            Self::Published => "published",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub slot: OutputSlot,
    pub document: SourceDocument,
    pub job: BuildJob,
    pub render: RenderResult,
    pub published: Option<String>,
    pub final_stage: PipelineStage,
}

#[derive(Debug, Clone)]
pub struct ReportPipeline {
    allocator: SlotAllocator,
    extra_packages: ExtraPackages,
    renderer: ContainerRenderer,
    publisher: ResultPathPublisher,
    log: LogSink,
}

impl ReportPipeline {
    pub fn new(
        allocator: SlotAllocator,
        extra_packages: ExtraPackages,
        renderer: ContainerRenderer,
        publisher: ResultPathPublisher,
        log: LogSink,
    ) -> Self {
        Self {
            allocator,
            extra_packages,
            renderer,
            publisher,
            log,
        }
    }

    pub fn from_settings(settings: &Settings, published: PublishedOutput, log: LogSink) -> Self {
        Self::new(
            SlotAllocator::new(&settings.output_dir),
            settings.extra_packages(),
            ContainerRenderer::new(
                settings.container_binary.clone(),
                settings.docker_image.clone(),
                settings.render_timeout(),
            ),
            ResultPathPublisher::new(&settings.output_dir, published),
            log,
        )
    }

    pub fn published(&self) -> &PublishedOutput {
        self.publisher.cell()
    }

    pub fn tool_spec() -> ToolSpec {
        ToolSpec {
            name: REPORT_TOOL_NAME.to_string(),
            description: REPORT_TOOL_DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "filename": {
                        "type": "string",
                        "description": "The output filename for the Quarto document, with extension \"qmd\"."
                    },
                    "answer": {
                        "type": "string",
                        "description": "The answer and explanation in Quarto markdown format."
                    }
                },
                "required": ["filename", "answer"]
            }),
        }
    }

    /// Tool-facing entry point: `true` when the document was saved, whatever
    /// happened to the render.
    pub fn report_answer(&self, filename: &str, answer: &str) -> bool {
        self.run(&ToolInvocation::new(filename, answer)).is_ok()
    }

    pub fn run(&self, invocation: &ToolInvocation) -> Result<ReportOutcome, ReportError> {
        self.stage(
            PipelineStage::Received,
            &format!(
                "filename=`{}` bytes={}",
                invocation.filename,
                invocation.content.len()
            ),
        );
        let result = self.run_stages(invocation);
        match &result {
            Ok(outcome) => self.stage(
                PipelineStage::Done,
                &format!(
                    "ok=true final_stage={} document={}",
                    outcome.final_stage.as_str(),
                    outcome.document.path.display()
                ),
            ),
            Err(err) => self.log.error("report.done", &format!("ok=false error={err}")),
        }
        result
    }

    fn run_stages(&self, invocation: &ToolInvocation) -> Result<ReportOutcome, ReportError> {
        if invocation.filename.trim().is_empty() {
            return Err(ReportError::EmptyFilename);
        }

        let slot = self.allocator.allocate(&invocation.filename)?;
        self.stage(
            PipelineStage::SlotAllocated,
            &format!(
                "directory={} collision_index={}",
                slot.directory_path.display(),
                slot.collision_index
            ),
        );

        let document = write_document(&slot, &invocation.filename, &invocation.content)?;
        self.stage(
            PipelineStage::DocumentWritten,
            &format!("path={}", document.path.display()),
        );

        let job = compose(&slot, &document.file_name, &self.extra_packages);
        self.stage(
            PipelineStage::JobComposed,
            &format!("script={}", job.shell_script()),
        );

        let render = self.renderer.run(&job, &slot.directory_path);
        let mut final_stage = PipelineStage::Rendered;
        let mut published = None;
        match &render.status {
            RenderStatus::Disabled => self.log.warn(
                "report.rendered",
                "no render image configured; document saved without rendering",
            ),
            RenderStatus::Completed => {
                self.stage(
                    PipelineStage::Rendered,
                    &format!("succeeded=true command={}", render.command_form),
                );
                match self.publisher.publish(&document.path) {
                    Ok(path) => {
                        self.stage(PipelineStage::Published, &format!("path={path}"));
                        final_stage = PipelineStage::Published;
                        published = Some(path);
                    }
                    Err(err) => self.log.error("report.published", &err.to_string()),
                }
            }
            failed => self.log.error(
                "report.rendered",
                &format!(
                    "succeeded=false status={} command={}\n{}",
                    failed.describe(),
                    render.command_form,
                    render.logs
                ),
            ),
        }

        Ok(ReportOutcome {
            slot,
            document,
            job,
            render,
            published,
            final_stage,
        })
    }

    fn stage(&self, stage: PipelineStage, message: &str) {
        self.log.info(&format!("report.{}", stage.as_str()), message);
    }
}
