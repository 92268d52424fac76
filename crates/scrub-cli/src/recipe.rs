//! The cleanup-and-reinstall recipe.
//!
//! Every step a run can perform, in execution order, each with the guards
//! that decide whether it applies. The planner evaluates the guards; nothing
//! here touches the filesystem.

use crate::config::Settings;
use scrub_core::{HostOs, Operation, Step};
use std::path::Path;

/// Build artifacts removed on Android, relative to the project root.
const ANDROID_BUILD_DIRS: &[&str] = &["android/build", "android/app/build"];

/// Build artifacts removed on iOS, relative to the project root.
const IOS_BUILD_DIRS: &[&str] = &["ios/Pods", "ios/build"];

/// All steps for `settings`, in execution order.
pub fn steps(settings: &Settings) -> Vec<Step> {
    let root = &settings.root;
    let pm = settings.package_manager;
    let timeout = settings.timeout;
    let mut steps = Vec::new();

    steps.push(
        Step::new(
            Operation::exec("Reset watchman watches", root, "watchman", ["watch-del-all"])
                .optional()
                .with_timeout(timeout),
        )
        .enabled(settings.watchman, "disabled by --no-watchman")
        .requires_tool("watchman"),
    );

    steps.extend(removals(root, &["node_modules"], |step| step));

    for lockfile in pm.lockfiles() {
        let path = root.join(lockfile);
        steps.push(
            Step::new(Operation::remove(format!("Remove {lockfile}"), &path))
                .enabled(!settings.keep_lockfile, "kept by --keep-lockfile")
                .if_exists(path),
        );
    }

    steps.push(
        Step::new(
            Operation::exec(
                format!("Clean {pm} cache"),
                root,
                pm.program(),
                pm.cache_clean_args().iter().copied(),
            )
            .destructive()
            .with_timeout(timeout),
        )
        .enabled(settings.clean_cache, "enable with --clean-cache"),
    );

    steps.extend(removals(root, IOS_BUILD_DIRS, |step| {
        step.enabled(!settings.skip_ios, "disabled by --skip-ios")
            .on_host(HostOs::MacOs)
    }));
    steps.extend(removals(root, ANDROID_BUILD_DIRS, |step| {
        step.enabled(!settings.skip_android, "disabled by --skip-android")
    }));

    let gradlew = root.join("android/gradlew");
    steps.push(
        Step::new(
            Operation::exec(
                "Clean Android build (gradlew clean)",
                root.join("android"),
                gradlew.display().to_string(),
                ["clean"],
            )
            .with_timeout(timeout),
        )
        .enabled(!settings.skip_android, "disabled by --skip-android")
        .if_exists(gradlew),
    );

    steps.push(
        Step::new(
            Operation::exec(
                format!("Install dependencies ({pm} install)"),
                root,
                pm.program(),
                ["install"],
            )
            .with_timeout(timeout),
        )
        .enabled(!settings.skip_install, "disabled by --skip-install"),
    );

    steps.push(
        Step::new(
            Operation::exec("Install pods (pod install)", root.join("ios"), "pod", ["install"])
                .optional()
                .with_timeout(timeout),
        )
        .enabled(!settings.skip_install, "disabled by --skip-install")
        .enabled(!settings.skip_ios, "disabled by --skip-ios")
        .on_host(HostOs::MacOs)
        .if_exists(root.join("ios/Podfile"))
        .requires_tool("pod"),
    );

    steps
}

/// Removal steps for `dirs` under `root`. `guards` runs before the
/// existence check, so its skip reasons take precedence.
fn removals<'a>(
    root: &'a Path,
    dirs: &'a [&str],
    guards: impl Fn(Step) -> Step + 'a,
) -> impl Iterator<Item = Step> + 'a {
    dirs.iter().map(move |dir| {
        let path = root.join(dir);
        guards(Step::new(Operation::remove(format!("Remove {dir}"), &path))).if_exists(path)
    })
}
