//! The `outline` command
//!
//! [`OutlineService`] wires the host capabilities to the resolver and the
//! planner. Only one outline runs at a time: a second request arriving while
//! one is being resolved or submitted is refused with
//! [`OutlineError::Busy`] rather than interleaving its commands.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use workarea_communication::MotionTransport;
use workarea_core::{AnalysisStore, BoundingBox, JobLocator};
use workarea_devicedb::MachineProfileProvider;
use workarea_settings::ConfigurationProvider;

use crate::error::{OutlineError, OutlineResult};
use crate::planner::OutlinePlanner;
use crate::resolver::BoundingBoxResolver;

/// Name of the only command the service answers
pub const OUTLINE_COMMAND: &str = "outline";

/// Reply to a command, shaped like an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineResponse {
    Success(BoundingBox),
    Failure { status: u16, message: String },
}

impl OutlineResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `{"X": [min, max], ...}` on success, the error message otherwise
    pub fn body(&self) -> Value {
        match self {
            Self::Success(bbox) => serde_json::to_value(bbox).unwrap_or(Value::Null),
            Self::Failure { message, .. } => Value::String(message.clone()),
        }
    }
}

impl From<OutlineResult<BoundingBox>> for OutlineResponse {
    fn from(result: OutlineResult<BoundingBox>) -> Self {
        match result {
            Ok(bbox) => Self::Success(bbox),
            Err(e) => Self::Failure {
                status: e.status(),
                message: e.to_string(),
            },
        }
    }
}

pub struct OutlineService {
    settings: Arc<dyn ConfigurationProvider>,
    locator: Arc<dyn JobLocator>,
    resolver: BoundingBoxResolver,
    planner: OutlinePlanner,
    transport: Arc<dyn MotionTransport>,
    in_flight: Mutex<()>,
}

impl OutlineService {
    pub fn new(
        settings: Arc<dyn ConfigurationProvider>,
        locator: Arc<dyn JobLocator>,
        store: Arc<dyn AnalysisStore>,
        profile: Arc<dyn MachineProfileProvider>,
        transport: Arc<dyn MotionTransport>,
    ) -> Self {
        let resolver = BoundingBoxResolver::new(locator.clone(), store);
        Self::with_resolver(settings, locator, resolver, profile, transport)
    }

    /// Service using a preconfigured resolver
    pub fn with_resolver(
        settings: Arc<dyn ConfigurationProvider>,
        locator: Arc<dyn JobLocator>,
        resolver: BoundingBoxResolver,
        profile: Arc<dyn MachineProfileProvider>,
        transport: Arc<dyn MotionTransport>,
    ) -> Self {
        tracing::info!("WorkAreaOutliner loaded");
        Self {
            settings,
            locator,
            resolver,
            planner: OutlinePlanner::new(profile),
            transport,
            in_flight: Mutex::new(()),
        }
    }

    pub fn resolver(&self) -> &BoundingBoxResolver {
        &self.resolver
    }

    /// Dispatch a named command
    pub fn handle_command(&self, command: &str) -> OutlineResponse {
        if command != OUTLINE_COMMAND {
            tracing::warn!("Unknown command {:?}", command);
            return Err(OutlineError::UnknownCommand(command.to_string())).into();
        }
        self.outline().into()
    }

    /// Resolve the selected job's work area and trace it
    ///
    /// Nothing is submitted unless the box resolves and the full plan can be
    /// built.
    pub fn outline(&self) -> OutlineResult<BoundingBox> {
        let _guard = self.in_flight.try_lock().ok_or(OutlineError::Busy)?;

        let settings = self.settings.snapshot();

        let job = self.locator.current_job().ok_or(OutlineError::NoActiveJob)?;
        if self.locator.is_printing() {
            return Err(OutlineError::JobPrinting);
        }

        let bbox = self.resolver.resolve(&job, settings.ignore_metadata)?;

        let outside = self.planner.profile().outside_build_volume(&bbox);
        if !outside.is_empty() {
            let axes: Vec<String> = outside.iter().map(|a| a.to_string()).collect();
            tracing::warn!(
                "Work area of {} exceeds the build volume on {}",
                job.filename,
                axes.join(", ")
            );
        }

        self.planner
            .plan_and_execute(&bbox, &settings, self.transport.as_ref())?;
        Ok(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workarea_communication::RecordingTransport;
    use workarea_core::{AxisRange, LocalJobLocator, MetadataFileStore};
    use workarea_devicedb::DeviceProfile;
    use workarea_settings::OutlinerSettings;

    struct Harness {
        _dir: tempfile::TempDir,
        locator: Arc<LocalJobLocator>,
        transport: Arc<RecordingTransport>,
        service: OutlineService,
    }

    fn harness(content: &str) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.gcode"), content).unwrap();

        let locator = Arc::new(LocalJobLocator::new(dir.path()));
        let transport = Arc::new(RecordingTransport::new());
        let service = OutlineService::new(
            Arc::new(OutlinerSettings::default()),
            locator.clone(),
            Arc::new(MetadataFileStore::new(dir.path())),
            Arc::new(DeviceProfile::new("p", "Printer")),
            transport.clone(),
        );

        Harness {
            _dir: dir,
            locator,
            transport,
            service,
        }
    }

    #[test]
    fn test_unknown_command() {
        let h = harness("G0 X1 Y1\n");
        let response = h.service.handle_command("trace");
        assert_eq!(
            response,
            OutlineResponse::Failure {
                status: 500,
                message: "Unknown Command".to_string()
            }
        );
        assert!(h.transport.is_empty());
    }

    #[test]
    fn test_no_job_selected() {
        let h = harness("G0 X1 Y1\n");
        let response = h.service.handle_command(OUTLINE_COMMAND);
        assert_eq!(response.status(), 409);
        assert_eq!(response.body(), Value::String("No file selected".into()));
        assert!(h.transport.is_empty());
    }

    #[test]
    fn test_refuses_while_printing() {
        let h = harness("G0 X1 Y1\n");
        h.locator.select("part.gcode");
        h.locator.set_printing(true);
        assert!(matches!(h.service.outline(), Err(OutlineError::JobPrinting)));
        assert!(h.transport.is_empty());
    }

    #[test]
    fn test_success_body() {
        let h = harness("; Bounds: X18.85 Y204.94 to X185.15 Y387.06\n");
        h.locator.select("part.gcode");

        let response = h.service.handle_command(OUTLINE_COMMAND);
        assert!(response.is_success());
        assert_eq!(
            response.body(),
            serde_json::json!({"X": [18.85, 185.15], "Y": [204.94, 387.06], "Z": [0.0, 0.0]})
        );
        assert_eq!(h.transport.commands()[0], "G28 XY");
    }

    #[test]
    fn test_nothing_resolves_emits_nothing() {
        let h = harness("; no motion at all\nM5\n");
        h.locator.select("part.gcode");

        let response = h.service.handle_command(OUTLINE_COMMAND);
        assert_eq!(
            response,
            OutlineResponse::Failure {
                status: 500,
                message: "Could not find work area.".to_string()
            }
        );
        assert!(h.transport.is_empty());
    }

    #[test]
    fn test_busy_when_guard_held() {
        let h = harness("G0 X1 Y1\n");
        h.locator.select("part.gcode");

        let held = h.service.in_flight.lock();
        assert!(matches!(h.service.outline(), Err(OutlineError::Busy)));
        drop(held);

        let bbox = h.service.outline().unwrap();
        assert_eq!(bbox.x, AxisRange::new(1.0, 1.0));
    }
}
