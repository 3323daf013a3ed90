//! Command-line parsing.
//!
//! The runtime's command line follows getopt conventions: short flags may be
//! combined (`-OO`, `-bv`), option arguments may be attached (`-cCODE`,
//! `-Xdev`) or given as the next token, and `-c`/`-m`/`--`/the first
//! positional argument end option processing.
//!
//! One [`Scanner`] serves two consumers:
//!
//! - [`prescan`] only picks out the handful of options that affect
//!   pre-configuration and never fails on anything it does not recognise.
//! - [`parse`] interprets the whole command line into a [`Config`] layer and
//!   turns usage problems, `--help` and `--version` into [`Error::Exit`].

use crate::config::schema::{Config, CpuCount, CHECK_HASH_CACHE_MODES, DEFAULT_PROGRAM_NAME};
use crate::config::validator::ConfigValidator;
use crate::error::{Error, ExitOutput, Result};
use crate::path::layout::RUNTIME_VERSION;
use crate::preconfig::PreConfig;
use crate::string_list::StringList;

/// Short options that take an argument.
const SHORT_WITH_ARG: &str = "cmWX";

/// Short options that take no argument.
const SHORT_FLAGS: &str = "bBdEhiIOPqRsSuvVx?";

/// Long options and whether they take an argument.
const LONG_OPTIONS: [(&str, bool); 6] = [
    ("help", false),
    ("help-env", false),
    ("help-xoptions", false),
    ("help-all", false),
    ("version", false),
    ("check-hash-based-cache", true),
];

/// Exit code for command-line usage errors.
pub const USAGE_EXIT_CODE: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Flag(char),
    Value(char, String),
    Long(&'static str),
    LongValue(&'static str, String),
    /// Option processing ended; program arguments start at this index.
    Rest(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanError {
    Unknown(String),
    MissingArgument(String),
}

struct Scanner<'a> {
    args: &'a [String],
    index: usize,
    offset: usize,
    stop_next: bool,
    done: bool,
}

impl<'a> Scanner<'a> {
    fn new(args: &'a [String]) -> Self {
        Self {
            args,
            index: 1,
            offset: 0,
            stop_next: false,
            done: false,
        }
    }

    fn finish(&mut self, rest: usize) -> Option<std::result::Result<Arg, ScanError>> {
        self.done = true;
        Some(Ok(Arg::Rest(rest.min(self.args.len()))))
    }

    fn next_long(&mut self, body: &str) -> std::result::Result<Arg, ScanError> {
        self.index += 1;
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(&(known, takes_value)) = LONG_OPTIONS.iter().find(|(n, _)| *n == name) else {
            return Err(ScanError::Unknown(format!("--{name}")));
        };

        if !takes_value {
            return match inline {
                None => Ok(Arg::Long(known)),
                Some(_) => Err(ScanError::Unknown(format!("--{body}"))),
            };
        }

        if let Some(value) = inline {
            return Ok(Arg::LongValue(known, value.to_string()));
        }
        match self.args.get(self.index) {
            Some(value) => {
                self.index += 1;
                Ok(Arg::LongValue(known, value.clone()))
            }
            None => Err(ScanError::MissingArgument(format!("--{known}"))),
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = std::result::Result<Arg, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.stop_next {
            return self.finish(self.index);
        }

        if self.offset == 0 {
            let Some(token) = self.args.get(self.index) else {
                return self.finish(self.index);
            };
            if token == "--" {
                return self.finish(self.index + 1);
            }
            if token == "-" || !token.starts_with('-') {
                return self.finish(self.index);
            }
            if let Some(body) = token.strip_prefix("--") {
                let result = self.next_long(body);
                if matches!(result, Err(ScanError::MissingArgument(_))) {
                    self.done = true;
                }
                return Some(result);
            }
            self.offset = 1;
        }

        let token = &self.args[self.index];
        let c = token[self.offset..].chars().next()?;
        self.offset += c.len_utf8();
        let attached = &token[self.offset..];

        if SHORT_WITH_ARG.contains(c) {
            let value = if attached.is_empty() {
                match self.args.get(self.index + 1) {
                    Some(value) => {
                        self.index += 1;
                        value.clone()
                    }
                    None => {
                        self.done = true;
                        return Some(Err(ScanError::MissingArgument(format!("-{c}"))));
                    }
                }
            } else {
                attached.to_string()
            };
            self.index += 1;
            self.offset = 0;
            if c == 'c' || c == 'm' {
                self.stop_next = true;
            }
            return Some(Ok(Arg::Value(c, value)));
        }

        if attached.is_empty() {
            self.index += 1;
            self.offset = 0;
        }

        if SHORT_FLAGS.contains(c) {
            Some(Ok(Arg::Flag(c)))
        } else {
            Some(Err(ScanError::Unknown(format!("-{c}"))))
        }
    }
}

fn split_xoption(option: &str) -> (&str, Option<&str>) {
    match option.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (option, None),
    }
}

/// Pick out the options relevant to pre-configuration.
///
/// Recognises `-E`, `-I`, `-X dev` and `-X utf8[=0|1]`. Everything else is
/// skipped without validation; option arguments are still consumed so that
/// `-W -X` or `-c -I` are never misread as flags.
///
/// # Examples
///
/// ```
/// use ember_init::config::cmdline::prescan;
/// use ember_init::StringList;
///
/// let args = StringList::from_raw(&["ember", "-W", "-E", "-Xutf8", "-z", "script.em", "-I"]);
/// let layer = prescan(&args);
/// assert_eq!(layer.use_environment, None);
/// assert_eq!(layer.utf8_mode, Some(true));
/// assert_eq!(layer.isolated, None);
/// ```
#[must_use]
pub fn prescan(args: &StringList) -> PreConfig {
    let mut layer = PreConfig::default();

    for item in Scanner::new(args.as_slice()) {
        match item {
            Ok(Arg::Flag('E')) => layer.use_environment = Some(false),
            Ok(Arg::Flag('I')) => {
                layer.isolated = Some(true);
                layer.use_environment = Some(false);
            }
            Ok(Arg::Value('X', option)) => match split_xoption(&option) {
                ("dev", _) => layer.dev_mode = Some(true),
                ("utf8", None | Some("1")) => layer.utf8_mode = Some(true),
                ("utf8", Some("0")) => layer.utf8_mode = Some(false),
                _ => {}
            },
            Ok(Arg::Rest(_)) | Err(ScanError::MissingArgument(_)) => break,
            _ => {}
        }
    }

    layer
}

/// Parse the full command line into a configuration layer.
///
/// The layer holds only what the command line specifies, plus `argv` and
/// the run mode. `args[0]` is the program name.
///
/// # Errors
///
/// - [`Error::Exit`] with code 0 for `--help`, `--help-*` and `--version`
/// - [`Error::Exit`] with code 2 for unknown options and missing arguments
///
/// # Examples
///
/// ```
/// use ember_init::config::cmdline::parse;
/// use ember_init::StringList;
///
/// let layer = parse(&StringList::from_raw(&["ember", "-OO", "-c", "print(1)", "x"])).unwrap();
/// assert_eq!(layer.optimization_level, Some(2));
/// assert_eq!(layer.run_command.as_deref(), Some("print(1)\n"));
/// assert_eq!(layer.argv.as_slice(), ["-c", "x"]);
/// ```
pub fn parse(args: &StringList) -> Result<Config> {
    let program = args.get(0).unwrap_or(DEFAULT_PROGRAM_NAME).to_string();
    let mut layer = Config::default();
    let mut bytes_warning = 0;
    let mut optimization_level = 0;
    let mut verbose = 0;
    let mut print_version = 0;
    let mut rest_start = args.len();

    for item in Scanner::new(args.as_slice()) {
        let arg = item.map_err(|err| usage_error(&program, &err))?;
        match arg {
            Arg::Flag('b') => bytes_warning += 1,
            Arg::Flag('B') => layer.write_bytecode = Some(false),
            Arg::Flag('d') => layer.parser_debug = Some(true),
            Arg::Flag('E') => layer.use_environment = Some(false),
            Arg::Flag('h' | '?') | Arg::Long("help") => {
                return Err(exit_with_stdout(usage(&program)));
            }
            Arg::Flag('i') => {
                layer.inspect = Some(true);
                layer.interactive = Some(true);
            }
            Arg::Flag('I') => {
                layer.isolated = Some(true);
                layer.use_environment = Some(false);
                layer.user_site_directory = Some(false);
                layer.safe_path = Some(true);
            }
            Arg::Flag('O') => optimization_level += 1,
            Arg::Flag('P') => layer.safe_path = Some(true),
            Arg::Flag('q') => layer.quiet = Some(true),
            Arg::Flag('R') => layer.use_hash_seed = Some(false),
            Arg::Flag('s') => layer.user_site_directory = Some(false),
            Arg::Flag('S') => layer.site_import = Some(false),
            Arg::Flag('u') => layer.buffered_stdio = Some(false),
            Arg::Flag('v') => verbose += 1,
            Arg::Flag('V') | Arg::Long("version") => print_version += 1,
            Arg::Flag('x') => layer.skip_source_first_line = Some(true),
            Arg::Value('c', code) => layer.run_command = Some(format!("{code}\n")),
            Arg::Value('m', module) => layer.run_module = Some(module),
            Arg::Value('W', filter) => layer.warnoptions.append(filter),
            Arg::Value('X', option) => layer.xoptions.append(option),
            Arg::Long("help-env") => return Err(exit_with_stdout(help_env())),
            Arg::Long("help-xoptions") => return Err(exit_with_stdout(help_xoptions())),
            Arg::Long("help-all") => {
                return Err(exit_with_stdout(format!(
                    "{}\n{}\n{}",
                    usage(&program),
                    help_xoptions(),
                    help_env()
                )));
            }
            Arg::LongValue("check-hash-based-cache", mode) => {
                if !CHECK_HASH_CACHE_MODES.contains(&mode.as_str()) {
                    return Err(Error::Exit {
                        code: USAGE_EXIT_CODE,
                        output: Some(ExitOutput::Stderr(format!(
                            "--check-hash-based-cache must be one of 'default', \
                             'always', or 'never'\n{}",
                            short_usage(&program)
                        ))),
                    });
                }
                layer.check_hash_cache_mode = Some(mode);
            }
            Arg::Rest(index) => {
                rest_start = index;
                break;
            }
            // The scanner only yields known flags.
            Arg::Flag(_) | Arg::Value(..) | Arg::Long(_) | Arg::LongValue(..) => {}
        }
    }

    if print_version > 0 {
        return Err(exit_with_stdout(version_text(print_version > 1)));
    }

    if bytes_warning > 0 {
        layer.bytes_warning = Some(bytes_warning);
    }
    if optimization_level > 0 {
        layer.optimization_level = Some(optimization_level);
    }
    if verbose > 0 {
        layer.verbose = Some(verbose);
    }

    let rest = args.as_slice().get(rest_start..).unwrap_or_default();
    if layer.run_command.is_some() {
        layer.argv.append("-c");
        rest.iter().for_each(|a| layer.argv.append(a.as_str()));
    } else if layer.run_module.is_some() {
        layer.argv.append("-m");
        rest.iter().for_each(|a| layer.argv.append(a.as_str()));
    } else if let Some(first) = rest.first() {
        if first != "-" {
            layer.run_filename = Some(first.clone());
        }
        layer.argv = StringList::from_raw(rest);
    } else {
        layer.argv.append("");
    }

    Ok(layer)
}

/// Interpret the `-X` options in `config.xoptions`, overwriting the fields
/// they control. Later occurrences win; unknown names are left alone.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for a recognised option with a malformed
/// value.
pub fn apply_xoptions(config: &mut Config) -> Result<()> {
    let options = config.xoptions.clone();
    for option in options.iter() {
        let (name, value) = split_xoption(option);
        let field = format!("-X {name}");
        match name {
            "dev" => config.dev_mode = Some(true),
            "utf8" => {
                if !matches!(value, None | Some("0" | "1")) {
                    return Err(Error::invalid_value(field, "expected utf8, utf8=0 or utf8=1"));
                }
            }
            "faulthandler" => config.faulthandler = Some(true),
            "importtime" => {
                config.import_time = Some(match value {
                    None | Some("1") => 1,
                    Some("2") => 2,
                    Some(other) => {
                        return Err(Error::invalid_value(
                            field,
                            format!("expected 1 or 2, got '{other}'"),
                        ))
                    }
                });
            }
            "tracemalloc" => {
                let frames = match value {
                    None => 1,
                    Some(v) => v.parse::<i32>().ok().filter(|n| *n >= 0).ok_or_else(|| {
                        Error::invalid_value(&field, format!("invalid number of frames '{v}'"))
                    })?,
                };
                config.tracemalloc = Some(frames);
            }
            "int_max_str_digits" => {
                let digits = value
                    .and_then(|v| v.parse::<i32>().ok())
                    .ok_or_else(|| Error::invalid_value(&field, "expected an integer"))?;
                ConfigValidator::validate_int_max_str_digits(&field, digits)?;
                config.int_max_str_digits = Some(digits);
            }
            "frozen_modules" => {
                config.use_frozen_modules = Some(match value {
                    Some("on") => true,
                    Some("off") => false,
                    _ => return Err(Error::invalid_value(field, "expected 'on' or 'off'")),
                });
            }
            "pycache_prefix" | "cache_prefix" => match value {
                Some(path) if !path.is_empty() => config.cache_prefix = Some(path.to_string()),
                _ => return Err(Error::invalid_value(field, "expected a directory")),
            },
            "warn_default_encoding" => config.warn_default_encoding = Some(true),
            "no_debug_ranges" => config.code_debug_ranges = Some(false),
            "showrefcount" => config.show_ref_count = Some(true),
            "perf" => config.perf_profiling = Some(true),
            "cpu_count" => {
                let count = value
                    .ok_or_else(|| "missing value".to_string())
                    .and_then(str::parse::<CpuCount>)
                    .map_err(|msg| Error::invalid_value(&field, msg))?;
                config.cpu_count = Some(count);
            }
            "gil" => config.platform.enable_gil = Some(parse_switch(&field, value)?),
            "thread_inherit_context" => {
                config.thread_inherit_context = Some(parse_switch(&field, value)?);
            }
            "context_aware_warnings" => {
                config.context_aware_warnings = Some(parse_switch(&field, value)?);
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_switch(field: &str, value: Option<&str>) -> Result<bool> {
    match value {
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        _ => Err(Error::invalid_value(field, "expected 0 or 1")),
    }
}

fn exit_with_stdout(text: String) -> Error {
    Error::Exit {
        code: 0,
        output: Some(ExitOutput::Stdout(text)),
    }
}

fn usage_error(program: &str, err: &ScanError) -> Error {
    let message = match err {
        ScanError::Unknown(option) => format!("Unknown option: {option}"),
        ScanError::MissingArgument(option) => format!("Argument expected for the {option} option"),
    };
    Error::Exit {
        code: USAGE_EXIT_CODE,
        output: Some(ExitOutput::Stderr(format!(
            "{message}\n{}",
            short_usage(program)
        ))),
    }
}

fn short_usage(program: &str) -> String {
    format!(
        "usage: {program} [option] ... [-c cmd | -m mod | file | -] [arg] ...\n\
         Try `{program} -h' for more information."
    )
}

/// Version text printed for `-V` (`-VV` for the long form).
#[must_use]
pub fn version_text(long: bool) -> String {
    if long {
        format!(
            "Ember {RUNTIME_VERSION} (ember-init {})",
            env!("CARGO_PKG_VERSION")
        )
    } else {
        format!("Ember {RUNTIME_VERSION}")
    }
}

/// The `--help` text.
#[must_use]
pub fn usage(program: &str) -> String {
    format!(
        "usage: {program} [option] ... [-c cmd | -m mod | file | -] [arg] ...
Options:
-b     : warn about bytes/str comparisons (-bb: make them errors)
-B     : don't write bytecode caches; also EMBER_DONT_WRITE_BYTECODE=x
-c cmd : program passed in as string (terminates option list)
-d     : parser debug output; also EMBER_DEBUG=x
-E     : ignore EMBER_* environment variables
-h     : print this help message and exit (also -? or --help)
-i     : inspect interactively after running the program; also EMBER_INSPECT=x
-I     : isolate from the user's environment (implies -E, -P and -s)
-m mod : run library module as a script (terminates option list)
-O     : remove assertions (-OO: also remove docstrings); also EMBER_OPTIMIZE=x
-P     : don't prepend a potentially unsafe path to the search path; also EMBER_SAFE_PATH
-q     : don't print version and copyright messages on interactive startup
-R     : use a random hash seed even if EMBER_HASH_SEED is set
-s     : don't add the user site directory; also EMBER_NO_USER_SITE=x
-S     : don't imply 'import site' on initialization
-u     : force the stdout and stderr streams to be unbuffered; also EMBER_UNBUFFERED=x
-v     : verbose (trace import statements); also EMBER_VERBOSE=x
-V     : print the version number and exit (also --version; -VV for more)
-W arg : warning control; also EMBER_WARNINGS=arg
-x     : skip first line of source
-X opt : set implementation-specific option (see --help-xoptions)
--check-hash-based-cache always|default|never:
         control how hash-based bytecode caches are validated
--help-env     : print help about EMBER_* environment variables and exit
--help-xoptions: print help about -X options and exit
--help-all     : print complete help information and exit
file   : program read from script file
-      : program read from stdin (default; interactive mode if a tty)
arg ...: arguments passed to the program in argv[1:]"
    )
}

/// The `--help-xoptions` text.
#[must_use]
pub fn help_xoptions() -> String {
    "The following implementation-specific options are available:
-X context_aware_warnings=[0|1]: context-local warning filters
-X cpu_count=N|default: override the reported processor count
-X dev : enable development mode
-X faulthandler: dump tracebacks on fatal signals
-X frozen_modules=[on|off]: whether to use frozen modules
-X gil=[0|1]: enable or disable the global lock (free-threaded builds)
-X importtime[=2]: show how long each import takes
-X int_max_str_digits=N: limit the size of int<->str conversions (0 disables)
-X no_debug_ranges: don't keep column information in code objects
-X perf: emit perf map entries
-X pycache_prefix=PATH: write bytecode caches under PATH
-X showrefcount: output the total reference count
-X thread_inherit_context=[0|1]: threads inherit the caller's context
-X tracemalloc[=N]: trace allocations, keeping N frames
-X utf8[=0|1]: enable (1) or disable (0) UTF-8 mode
-X warn_default_encoding: warn when the default encoding is used implicitly"
        .to_string()
}

/// The `--help-env` text.
#[must_use]
pub fn help_env() -> String {
    "Environment variables that change behavior:
EMBER_HOME       : alternate prefix directory (or prefix:exec_prefix)
EMBER_PATH       : extra module search directories (path-list separated)
EMBER_CACHE_PREFIX: root directory for bytecode caches
EMBER_HASH_SEED  : 'random' or an integer in [0, 4294967295]
EMBER_IO_ENCODING: encoding[:errors] for stdin/stdout/stderr
EMBER_INT_MAX_STR_DIGITS: limit on int<->str conversion digits
EMBER_MALLOC     : memory allocator and debug hooks
EMBER_COERCE_C_LOCALE: 0 disables C locale coercion, 'warn' reports it
EMBER_UTF8       : 1 enables UTF-8 mode, 0 disables it
EMBER_DEV_MODE   : enable development mode
EMBER_PLATLIBDIR : override the platform library directory name
EMBER_WARNINGS   : comma-separated warning filters
EMBER_TRACEMALLOC: number of frames kept by the allocation tracer
EMBER_CPU_COUNT  : 'default' or the processor count to report"
        .to_string()
}
