pub mod package;

pub use package::{package_for, PackageInfo, PACKAGES};
