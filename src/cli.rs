//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use luscious_core::{AlbumType, ContentType, DEFAULT_LANDING_LIMIT, SortOrder, VideoQuality};

/// Download albums and videos from luscious.net.
#[derive(Parser, Debug)]
#[command(name = "luscious")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Root directory for downloads (default: config file, then current directory)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Account name to log in with before running the command
    #[arg(long, global = true, requires = "password")]
    pub username: Option<String>,

    /// Account password
    #[arg(long, global = true, requires = "username")]
    pub password: Option<String>,

    /// Retries after the first attempt for transient failures (0-10)
    #[arg(short = 'r', long, global = true, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: Option<u32>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Site origin override (testing against a local server)
    #[arg(long, global = true, hide = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an album by id or URL
    Album {
        /// Album id or URL, e.g. https://www.luscious.net/albums/animated-gifs_374481/
        input: String,

        /// Print album details without downloading
        #[arg(long)]
        info: bool,
    },

    /// Download a video by id or URL
    Video {
        /// Video id or URL
        input: String,

        /// Preferred resolution (240, 360, 720 or 1080); lower ones are used if missing
        #[arg(long)]
        quality: Option<VideoQuality>,

        /// Print video details without downloading
        #[arg(long)]
        info: bool,
    },

    /// Search albums (or videos with --videos)
    Search {
        /// Search text
        query: String,

        /// Result page (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Sort order, e.g. rating_all_time or date_newest
        #[arg(long, default_value_t = SortOrder::default())]
        sort: SortOrder,

        /// Album kind: All, Manga or Pictures
        #[arg(long, default_value_t = AlbumType::default())]
        album_type: AlbumType,

        /// Content category code: 0 all, 1 hentai, 2 non-erotic, 3 real people
        #[arg(long, default_value_t = ContentType::default())]
        content: ContentType,

        /// Search videos instead of albums
        #[arg(long)]
        videos: bool,
    },

    /// List the front page sections
    Landing {
        /// Albums per section
        #[arg(long, default_value_t = DEFAULT_LANDING_LIMIT)]
        limit: u32,
    },

    /// Print the id of a recently active album
    Random,
}
