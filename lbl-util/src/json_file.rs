// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{Context, Result};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

/// Read a json file with an optional `//` or `#` comment preamble. Comment
/// lines are blanked so that serde_json error positions stay accurate.
fn read_json_body<P: AsRef<Path>>(path: P) -> Result<String> {
    let buf = fs::read_to_string(path.as_ref())?;
    let mut body = String::with_capacity(buf.len());

    for line in buf.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with("//") && !trimmed.starts_with('#') {
            body += line;
        }
        body += "\n";
    }
    Ok(body)
}

pub trait JsonLoad
where
    Self: DeserializeOwned,
{
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let body = read_json_body(&path)?;
        serde_json::from_str::<Self>(&body)
            .with_context(|| format!("failed to parse {:?}", path.as_ref()))
    }
}

pub trait JsonSave
where
    Self: Default + Serialize,
{
    fn preamble() -> Option<String> {
        None
    }

    fn maybe_create_dfl<P: AsRef<Path>>(path_in: P) -> Result<bool> {
        let path = path_in.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(&parent)?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => {
                let data: Self = Default::default();
                f.write_all(data.as_json()?.as_ref())?;
                Ok(true)
            }
            Err(e) => match e.kind() {
                io::ErrorKind::AlreadyExists => Ok(false),
                _ => Err(e.into()),
            },
        }
    }

    fn as_json(&self) -> Result<String> {
        let mut serialized = serde_json::to_string_pretty(&self)?;
        if !serialized.ends_with('\n') {
            serialized += "\n";
        }
        match Self::preamble() {
            Some(pre) => Ok(pre + &serialized),
            None => Ok(serialized),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        f.write_all(self.as_json()?.as_ref())?;
        Ok(())
    }
}

/// A json file backing some configuration, e.g. the base command line
/// arguments. `path` is `None` when there's no file and `data` holds the
/// defaults.
#[derive(Clone, Debug)]
pub struct JsonConfigFile<T: JsonLoad + JsonSave> {
    pub path: Option<PathBuf>,
    pub data: T,
}

impl<T: JsonLoad + JsonSave> JsonConfigFile<T> {
    pub fn load<P: AsRef<Path>>(path_in: P) -> Result<Self> {
        let path = path_in.as_ref();
        let data = T::load(&path)?;

        Ok(Self {
            path: Some(PathBuf::from(path)),
            data,
        })
    }

    pub fn load_or_create<P: AsRef<Path>>(path_opt: Option<P>) -> Result<Self> {
        match path_opt {
            Some(path_in) => {
                let path = path_in.as_ref();
                if T::maybe_create_dfl(&path)? {
                    info!("cfg: Created {:?}", &path);
                }
                Self::load(path)
            }
            None => {
                Ok(Self {
                    path: None,
                    data: Default::default(),
                })
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match self.path.as_deref() {
            Some(path) => self.data.save(&path),
            None => Ok(()),
        }
    }
}

pub trait JsonArgs
where
    Self: JsonLoad + JsonSave,
{
    fn match_cmdline() -> clap::ArgMatches<'static>;
    fn verbosity(matches: &clap::ArgMatches) -> u32;
    /// Apply `matches` on top of the loaded base arguments. Returns whether
    /// any of the persistent fields changed.
    fn process_cmdline(&mut self, matches: &clap::ArgMatches) -> Result<bool>;
}

pub trait JsonArgsHelper
where
    Self: JsonArgs,
{
    fn init_args_and_logging_nosave() -> Result<(JsonConfigFile<Self>, bool)>;
    fn save_args(args_file: &JsonConfigFile<Self>) -> Result<()>;
    fn init_args_and_logging() -> Result<JsonConfigFile<Self>>;
}

impl<T> JsonArgsHelper for T
where
    T: JsonArgs,
{
    fn init_args_and_logging_nosave() -> Result<(JsonConfigFile<T>, bool)> {
        let matches = T::match_cmdline();
        super::init_logging(T::verbosity(&matches));

        let mut args_file = JsonConfigFile::<T>::load_or_create(matches.value_of("args"))?;
        let updated = args_file.data.process_cmdline(&matches)?;

        Ok((args_file, updated))
    }

    fn save_args(args_file: &JsonConfigFile<T>) -> Result<()> {
        if let Some(path) = args_file.path.as_deref() {
            info!("Updating command line arguments file {:?}", path);
            args_file.save()?;
        }
        Ok(())
    }

    fn init_args_and_logging() -> Result<JsonConfigFile<T>> {
        let (args_file, updated) = Self::init_args_and_logging_nosave()?;
        if updated {
            Self::save_args(&args_file)?;
        }
        Ok(args_file)
    }
}

/// Report file which is written to `PATH.staging` first and then renamed
/// over `PATH` so that readers never see a partial file.
#[derive(Debug)]
pub struct JsonReportFile<T: JsonSave> {
    pub path: PathBuf,
    pub staging: PathBuf,
    pub data: T,
}

impl<T: JsonSave> JsonReportFile<T> {
    pub fn new<P: AsRef<Path>>(path_in: P, data: T) -> Self {
        let path = PathBuf::from(path_in.as_ref());
        let mut staging = path.clone().into_os_string();
        staging.push(".staging");

        Self {
            path,
            staging: PathBuf::from(staging),
            data,
        }
    }

    pub fn commit(&self) -> Result<()> {
        self.data.save(&self.staging)?;
        fs::rename(&self.staging, &self.path)?;
        Ok(())
    }
}
