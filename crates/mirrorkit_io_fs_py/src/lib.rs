use std::collections::BTreeMap;
use std::path::Path;

use mirrorkit_io_fs::{
    DirTree, EnumListPatternMode, ListTreeError, MirrorTreeError, ReportMirror, SourceTree,
    SpecListOptions, SpecMirrorOptions, format_file_info, glob_star, glob_star_matching,
    mirror_tree,
};
use pyo3::create_exception;
use pyo3::exceptions::{PyNotADirectoryError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "mirrorkit.fs.xcopy.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

create_exception!(
    _mirrorkit_io_fs_rs,
    MirrorFailedError,
    PyOSError,
    "Mirror run aborted. `args` is `(message, ReportMirror)` with the partial report."
);

#[pyclass(name = "ReportMirror")]
#[derive(Debug, Clone)]
struct PyReportMirror {
    #[pyo3(get)]
    mapping: BTreeMap<String, String>,
    #[pyo3(get)]
    change_report: String,
    #[pyo3(get)]
    cnt_visited: u64,
    #[pyo3(get)]
    cnt_copied: u64,
    #[pyo3(get)]
    cnt_created: u64,
    #[pyo3(get)]
    cnt_skipped: u64,
    #[pyo3(get)]
    cnt_walk_errors: u64,
    #[pyo3(get)]
    warnings: Vec<String>,
    summary: String,
    dict_counts: BTreeMap<String, u64>,
}

impl From<ReportMirror> for PyReportMirror {
    fn from(report_mirror: ReportMirror) -> Self {
        Self {
            mapping: report_mirror
                .mapping
                .iter()
                .map(|(key, path_dst)| (key.clone(), path_dst.to_string_lossy().into_owned()))
                .collect(),
            change_report: report_mirror.change_report(),
            cnt_visited: report_mirror.cnt_visited,
            cnt_copied: report_mirror.cnt_copied,
            cnt_created: report_mirror.cnt_created,
            cnt_skipped: report_mirror.cnt_skipped,
            cnt_walk_errors: report_mirror.cnt_walk_errors,
            summary: report_mirror.to_string(),
            dict_counts: report_mirror.to_dict(),
            warnings: report_mirror.warnings,
        }
    }
}

#[pymethods]
impl PyReportMirror {
    #[getter]
    fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.dict_counts.clone()
    }

    fn __str__(&self) -> String {
        self.summary.clone()
    }
}

fn parse_rule_pattern(value: &str) -> PyResult<EnumListPatternMode> {
    match value {
        "glob" => Ok(EnumListPatternMode::Glob),
        "regex" => Ok(EnumListPatternMode::Regex),
        "literal" => Ok(EnumListPatternMode::Literal),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pattern strategy: `{value}`. Expected one of: ['glob', 'regex', 'literal']"
        ))),
    }
}

fn ensure_source_dir(dir_source: &str) -> PyResult<()> {
    if Path::new(dir_source).is_dir() {
        return Ok(());
    }
    Err(PyNotADirectoryError::new_err(format!(
        "Source is not a directory: {dir_source}"
    )))
}

fn map_mirror_tree_error(exception: MirrorTreeError) -> PyErr {
    let (report_mirror, error) = exception.into_parts();
    MirrorFailedError::new_err((error.to_string(), PyReportMirror::from(report_mirror)))
}

fn map_list_tree_error(exception: ListTreeError) -> PyErr {
    PyValueError::new_err(exception.to_string())
}

#[pyfunction(name = "xcopy")]
#[pyo3(signature = (
    dir_source,
    dir_destination,
    prefix_src = "",
    prefix_dst = "",
    mode_file = 0o644,
    mode_dir = 0o755
))]
fn xcopy_py(
    py: Python<'_>,
    dir_source: String,
    dir_destination: String,
    prefix_src: &str,
    prefix_dst: &str,
    mode_file: u32,
    mode_dir: u32,
) -> PyResult<PyReportMirror> {
    ensure_source_dir(&dir_source)?;
    let spec_mr_options = SpecMirrorOptions {
        mode_file,
        mode_dir,
    };
    let tree = DirTree::new(dir_source);

    let report_mirror = py.allow_threads(|| {
        mirror_tree(
            &tree,
            prefix_src,
            dir_destination,
            prefix_dst,
            spec_mr_options,
        )
    });
    let report_mirror = report_mirror.map_err(map_mirror_tree_error)?;
    Ok(PyReportMirror::from(report_mirror))
}

#[pyfunction(name = "glob_star")]
#[pyo3(signature = (dir_source, prefix_src = ""))]
fn glob_star_py(py: Python<'_>, dir_source: String, prefix_src: &str) -> PyResult<Vec<String>> {
    ensure_source_dir(&dir_source)?;
    let tree = DirTree::new(dir_source);
    Ok(py.allow_threads(|| glob_star(&tree, prefix_src)))
}

#[pyfunction(name = "glob_star_matching")]
#[pyo3(signature = (
    dir_source,
    prefix_src = "",
    patterns_include = None,
    patterns_exclude = None,
    rule_pattern = "glob"
))]
fn glob_star_matching_py(
    py: Python<'_>,
    dir_source: String,
    prefix_src: &str,
    patterns_include: Option<Vec<String>>,
    patterns_exclude: Option<Vec<String>>,
    rule_pattern: &str,
) -> PyResult<Vec<String>> {
    ensure_source_dir(&dir_source)?;
    let spec_ls_options = SpecListOptions {
        patterns_include,
        patterns_exclude,
        rule_pattern: parse_rule_pattern(rule_pattern)?,
    };
    let tree = DirTree::new(dir_source);

    py.allow_threads(|| glob_star_matching(&tree, prefix_src, &spec_ls_options))
        .map_err(map_list_tree_error)
}

#[pyfunction(name = "format_file_info")]
#[pyo3(signature = (dir_source, path = "."))]
fn format_file_info_py(dir_source: String, path: &str) -> PyResult<String> {
    let tree = DirTree::new(dir_source);
    let meta = tree
        .stat(path)
        .map_err(|e| PyOSError::new_err(format!("Failed to stat `{path}`: {e}")))?;
    Ok(format_file_info(&meta))
}

#[pyfunction(name = "init_logging")]
#[pyo3(signature = (level = "info"))]
fn init_logging_py(level: &str) -> PyResult<()> {
    mirrorkit_log::init_logging(level).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

#[pymodule]
fn _mirrorkit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportMirror>()?;
    module.add("MirrorFailedError", module.py().get_type::<MirrorFailedError>())?;
    module.add_function(wrap_pyfunction!(xcopy_py, module)?)?;
    module.add_function(wrap_pyfunction!(glob_star_py, module)?)?;
    module.add_function(wrap_pyfunction!(glob_star_matching_py, module)?)?;
    module.add_function(wrap_pyfunction!(format_file_info_py, module)?)?;
    module.add_function(wrap_pyfunction!(init_logging_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
