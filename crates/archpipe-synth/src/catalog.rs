//! Static scenario catalog for the demo pipeline.
//!
//! Six scenario stages follow the source stage in a fixed order. Each
//! entry describes one build action: the job it runs, the architecture it
//! targets, the buildspec it consumes, the overlay overrides, and its
//! run order within the stage.

use archpipe_core::Arch;
use serde::{Deserialize, Serialize};

/// Buildspec files consumed from the payload repository. Their contents
/// are external collaborator artifacts; only the paths are authored here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildSpec {
    /// Single-architecture container build.
    Native,

    /// Manifest-list build combining both single-arch images.
    NativeMultiArch,

    /// Emulated (QEMU) multi-arch build, used for the speed comparison.
    EmulatedSpeed,
}

impl BuildSpec {
    /// Path of the buildspec within the source tree.
    pub fn path(&self) -> &'static str {
        match self {
            BuildSpec::Native => "native_build/native_build.yml",
            BuildSpec::NativeMultiArch => "native_build/native_build_multi_arch.yml",
            BuildSpec::EmulatedSpeed => "emulated_speed/emulated_speed.yml",
        }
    }
}

/// Overlay overrides for one catalog entry, layered over the base set.
///
/// `None` means the key is not set for that entry (the emulated-speed job
/// runs with the base set only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySpec {
    pub files_location: Option<&'static str>,
    pub container_name: Option<&'static str>,
    pub platform: Option<Arch>,
}

impl OverlaySpec {
    const BASE_ONLY: Self = Self {
        files_location: None,
        container_name: None,
        platform: None,
    };

    const fn new(files_location: &'static str, container_name: &'static str, platform: Arch) -> Self {
        Self {
            files_location: Some(files_location),
            container_name: Some(container_name),
            platform: Some(platform),
        }
    }
}

/// One build action of a scenario stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Build-job id, unique across the pipeline.
    pub job_id: &'static str,

    /// Action name within the stage.
    pub action_name: &'static str,

    /// Architecture selecting the build image.
    pub arch: Arch,

    pub build_spec: BuildSpec,
    pub overlay: OverlaySpec,
    pub run_order: u32,

    /// Explicit timeout in minutes; `None` uses the platform default.
    pub timeout_minutes: Option<u32>,
}

impl CatalogEntry {
    const fn new(
        job_id: &'static str,
        action_name: &'static str,
        arch: Arch,
        build_spec: BuildSpec,
        overlay: OverlaySpec,
        run_order: u32,
    ) -> Self {
        Self {
            job_id,
            action_name,
            arch,
            build_spec,
            overlay,
            run_order,
            timeout_minutes: None,
        }
    }
}

/// A scenario stage: ordered name plus its build actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStage {
    pub name: &'static str,
    pub entries: &'static [CatalogEntry],
}

/// Concept 1A: native build-speed comparison with a combining job.
const NATIVE_SPEED: &[CatalogEntry] = &[
    CatalogEntry::new(
        "Native_Speed_x86_Build",
        "Native_Speed_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("native_speed", "compute_bound_native", Arch::X86),
        1,
    ),
    CatalogEntry::new(
        "Native_Speed_arm64_Build",
        "Native_Speed_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("native_speed", "compute_bound_native", Arch::Arm64),
        1,
    ),
    // The combining job runs on the arm image and sees the arm64 overlay
    // (PLATFORM keeps the last-set value, as in the source stack).
    CatalogEntry::new(
        "Native_Speed_Multi-Arch_Build",
        "Native_Speed_Multi_Arch_Build",
        Arch::Arm64,
        BuildSpec::NativeMultiArch,
        OverlaySpec::new("native_speed", "compute_bound_native", Arch::Arm64),
        2,
    ),
];

/// Concept 1B: same multi-arch build under emulation, one job, 120-minute
/// timeout, base overlay only.
const EMULATED_SPEED: &[CatalogEntry] = &[CatalogEntry {
    job_id: "Emulated_Speed_Multi-Arch_Build",
    action_name: "Emulated_Speed_Multi-Arch_Build",
    arch: Arch::X86,
    build_spec: BuildSpec::EmulatedSpeed,
    overlay: OverlaySpec::BASE_ONLY,
    run_order: 1,
    timeout_minutes: Some(120),
}];

/// Concept 2A: software that runs on both architectures.
const SOFTWARE_RUNNING: &[CatalogEntry] = &[
    CatalogEntry::new(
        "Software_Running_x86_Build",
        "Software_Running_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("software_running", "software_running", Arch::X86),
        1,
    ),
    CatalogEntry::new(
        "Software_Running_arm64_Build",
        "Software_Running_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("software_running", "software_running", Arch::Arm64),
        1,
    ),
    CatalogEntry::new(
        "Software_Running_Multi-Arch_Build",
        "Software_Running_Multi_Arch_Build",
        Arch::Arm64,
        BuildSpec::NativeMultiArch,
        OverlaySpec::new("software_running", "software_running", Arch::Arm64),
        2,
    ),
];

/// Concept 2B: software that breaks on arm64 until fixed. The arm64
/// "fixes" variants change FILES_LOCATION but keep the x86 variant's
/// CONTAINER_NAME, matching the deployed demo (see DESIGN.md before
/// changing either value).
const SOFTWARE_NOT_RUNNING: &[CatalogEntry] = &[
    CatalogEntry::new(
        "Python_x86_Build",
        "Python_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("software_not_running/python_issues", "python", Arch::X86),
        1,
    ),
    CatalogEntry::new(
        "Python_Fixes_arm64_Build",
        "Python_Fixes_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("software_not_running/python_fixes", "python", Arch::Arm64),
        1,
    ),
    CatalogEntry::new(
        "Nodejs_x86_Build",
        "Nodejs_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("software_not_running/nodejs_issues", "nodejs", Arch::X86),
        2,
    ),
    CatalogEntry::new(
        "Nodejs_Fixes_arm64_Build",
        "Nodejs_Fixes_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("software_not_running/nodejs_fixes", "nodejs", Arch::Arm64),
        2,
    ),
];

/// Concept 3A: runtime test suite, issues on x86 and fixes on arm64.
const RUNTIME_TESTS: &[CatalogEntry] = &[
    CatalogEntry::new(
        "Go_Tests_x86_Build",
        "Go_Tests_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("runtime_tests/go_tests_issues", "go", Arch::X86),
        1,
    ),
    CatalogEntry::new(
        "Go_Tests_arm64_Build",
        "Go_Tests_Fixes_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("runtime_tests/go_tests_fixed", "go", Arch::Arm64),
        1,
    ),
];

/// Concept 3B: classifier training time, compared across architectures.
const PERF_TESTS: &[CatalogEntry] = &[
    CatalogEntry::new(
        "XGBoost_x86_Build",
        "XGBoost_Perf_x86_Build",
        Arch::X86,
        BuildSpec::Native,
        OverlaySpec::new("perf_tests", "xgboost", Arch::X86),
        1,
    ),
    CatalogEntry::new(
        "XGBoost_arm64_Build",
        "XGBoost_Perf_arm64_Build",
        Arch::Arm64,
        BuildSpec::Native,
        OverlaySpec::new("perf_tests", "xgboost", Arch::Arm64),
        1,
    ),
];

/// The six scenario stages in pipeline order.
pub const SCENARIO_STAGES: &[ScenarioStage] = &[
    ScenarioStage {
        name: "Concept_1A_Build_Speed_Native",
        entries: NATIVE_SPEED,
    },
    ScenarioStage {
        name: "Concept_1B_Build_Speed_Emulated",
        entries: EMULATED_SPEED,
    },
    ScenarioStage {
        name: "Concept_2A_Software_Running",
        entries: SOFTWARE_RUNNING,
    },
    ScenarioStage {
        name: "Concept_2B_Software_Not_Running",
        entries: SOFTWARE_NOT_RUNNING,
    },
    ScenarioStage {
        name: "Concept_3A_Runtime_Tests",
        entries: RUNTIME_TESTS,
    },
    ScenarioStage {
        name: "Concept_3B_Performance_Tests",
        entries: PERF_TESTS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_count_and_order() {
        let names: Vec<_> = SCENARIO_STAGES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "Concept_1A_Build_Speed_Native",
                "Concept_1B_Build_Speed_Emulated",
                "Concept_2A_Software_Running",
                "Concept_2B_Software_Not_Running",
                "Concept_3A_Runtime_Tests",
                "Concept_3B_Performance_Tests",
            ]
        );
    }

    #[test]
    fn test_buildspec_paths() {
        assert_eq!(BuildSpec::Native.path(), "native_build/native_build.yml");
        assert_eq!(
            BuildSpec::NativeMultiArch.path(),
            "native_build/native_build_multi_arch.yml"
        );
        assert_eq!(
            BuildSpec::EmulatedSpeed.path(),
            "emulated_speed/emulated_speed.yml"
        );
    }

    #[test]
    fn test_job_ids_unique() {
        let mut ids = std::collections::HashSet::new();
        for stage in SCENARIO_STAGES {
            for entry in stage.entries {
                assert!(ids.insert(entry.job_id), "duplicate job id {}", entry.job_id);
            }
        }
        assert_eq!(ids.len(), 15, "fifteen build jobs across the catalog");
    }

    #[test]
    fn test_entry_counts_per_stage() {
        let counts: Vec<usize> = SCENARIO_STAGES.iter().map(|s| s.entries.len()).collect();
        // 3 native-speed + 1 emulated + 3 software-running
        // + 4 software-not-running + 2 runtime + 2 perf = 15
        assert_eq!(counts, vec![3, 1, 3, 4, 2, 2]);
        assert_eq!(counts.iter().sum::<usize>(), 15);
    }

    #[test]
    fn test_only_emulated_job_has_timeout() {
        for stage in SCENARIO_STAGES {
            for entry in stage.entries {
                if entry.job_id == "Emulated_Speed_Multi-Arch_Build" {
                    assert_eq!(entry.timeout_minutes, Some(120));
                } else {
                    assert!(entry.timeout_minutes.is_none(), "{}", entry.job_id);
                }
            }
        }
    }

    #[test]
    fn test_combining_jobs_gated_at_run_order_two() {
        for stage in SCENARIO_STAGES {
            for entry in stage.entries {
                if entry.build_spec == BuildSpec::NativeMultiArch {
                    assert_eq!(entry.run_order, 2, "{}", entry.job_id);
                }
            }
        }
    }

    #[test]
    fn test_fix_variants_reuse_container_name() {
        // The observed source behavior: the arm64 fixes variants keep the
        // x86 variant's container name while moving FILES_LOCATION.
        let python: Vec<_> = SOFTWARE_NOT_RUNNING
            .iter()
            .filter(|e| e.job_id.starts_with("Python"))
            .collect();
        assert_eq!(python[0].overlay.container_name, Some("python"));
        assert_eq!(python[1].overlay.container_name, Some("python"));
        assert_ne!(
            python[0].overlay.files_location,
            python[1].overlay.files_location
        );
    }
}
