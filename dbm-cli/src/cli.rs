use crate::project_info::{metadata, version_info};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 数据库配置来源：JSON 文件与 `--set` 键值对，后者覆盖前者
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// 设置配置项，可重复，例如 --set name=pg --set postgresSettings.hostAuthMethod=md5
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// 从 JSON 文件读取配置对象
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// DBM CLI - 容器化数据库管理工具
#[derive(Parser)]
#[command(name = "dbm")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径（默认依次查找 dbm.toml、.dbm.toml、config.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 创建配置文件和数据目录
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
    /// 列出支持的数据库类型
    Providers,
    /// 显示某种数据库的配置字段
    Fields {
        /// 数据库类型，例如 postgresql
        db_type: String,
        /// 以编辑模式显示（创建后不可修改的字段标记为只读）
        #[arg(long)]
        edit: bool,
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 校验配置但不创建容器
    Validate {
        db_type: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// 预览将要使用的启动参数
    Compile {
        db_type: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// 创建数据库容器
    Create {
        db_type: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// 修改已有容器（名称、端口、持久化变化时会重建容器）
    Update {
        id: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// 列出所有容器
    List {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 启动容器
    Start { id: String },
    /// 停止容器
    Stop { id: String },
    /// 删除容器
    Rm { id: String },
    /// 显示容器的连接串
    Connection { id: String },
    /// 检查 Docker 是否可用
    Status,
    /// 持续同步容器状态并监控 Docker，Ctrl-C 退出
    Watch,
}
