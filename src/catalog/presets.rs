// src/catalog/presets.rs

//! Built-in, read-only command groups for each platform.

use crate::catalog::model::CommandDef;
use crate::types::Platform;

/// A titled group of built-in commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetGroup {
    pub title: &'static str,
    pub commands: Vec<CommandDef>,
}

type Table = &'static [(&'static str, &'static [(&'static str, &'static str)])];

const WINDOWS: Table = &[
    (
        "System information",
        &[
            ("System details", "systeminfo | findstr /C:\"OS\""),
            ("IP configuration", "ipconfig /all"),
            ("Disk space", "wmic logicaldisk get name,size,freespace,filesystem"),
            ("Process list", "tasklist"),
            ("Battery report", "powercfg /batteryreport /output battery.html & echo Report generated"),
            ("CPU load", "wmic cpu get loadpercentage"),
        ],
    ),
    (
        "Network",
        &[
            ("Ping baidu.com", "ping -n 4 www.baidu.com"),
            ("Ping google.com", "ping -n 4 www.google.com"),
            ("Connections", "netstat -ano"),
            ("Flush DNS", "ipconfig /flushdns"),
            ("Routing table", "route print"),
            ("WiFi profiles", "netsh wlan show profiles"),
        ],
    ),
    (
        "Files",
        &[
            ("Open Explorer here", "explorer ."),
            ("Clean temp files", "del /q /f /s %TEMP%\\* 2>nul"),
            ("Current directory", "dir"),
            ("Windows directory", "explorer C:\\Windows"),
            ("User directory", "explorer %USERPROFILE%"),
            ("Downloads", "explorer %USERPROFILE%\\Downloads"),
        ],
    ),
    (
        "System tools",
        &[
            ("Task manager", "taskmgr"),
            ("Control panel", "control"),
            ("Device manager", "devmgmt.msc"),
            ("Resource monitor", "resmon"),
            ("Registry editor", "regedit"),
            ("Disk cleanup", "cleanmgr"),
        ],
    ),
];

const LINUX: Table = &[
    (
        "System information",
        &[
            ("System info", "uname -a"),
            ("Memory usage", "free -h"),
            ("Disk space", "df -h"),
            ("CPU info", "lscpu | head -25"),
            ("Load average", "uptime"),
            ("Battery", "upower -i /org/freedesktop/UPower/devices/battery_BAT0 2>/dev/null || echo 'no battery information'"),
        ],
    ),
    (
        "Network",
        &[
            ("Ping baidu.com", "ping -c 4 www.baidu.com"),
            ("Ping google.com", "ping -c 4 www.google.com"),
            ("Interfaces", "ip addr show"),
            ("Listening sockets", "ss -tuln"),
            ("Routing table", "ip route"),
            ("WiFi networks", "nmcli dev wifi list 2>/dev/null || iwconfig 2>/dev/null"),
        ],
    ),
    (
        "Processes",
        &[
            ("Process list", "ps aux | head -25"),
            ("Top snapshot", "top -bn1 | head -20"),
            ("Ports in use", "netstat -tulpn 2>/dev/null || ss -tulpn"),
            ("Running services", "systemctl list-units --type=service --state=running | head -25"),
            ("Disk IO", "iostat 2>/dev/null || echo 'install sysstat'"),
            ("Temperatures", "sensors 2>/dev/null || echo 'install lm-sensors'"),
        ],
    ),
    (
        "Files",
        &[
            ("Current directory", "ls -lah"),
            ("Largest entries", "du -h --max-depth=1 | sort -hr | head -10"),
            ("Clean package cache", "sudo apt clean 2>/dev/null || sudo yum clean all 2>/dev/null || echo 'clean manually'"),
            ("Home directory", "cd ~ && pwd && ls -lah"),
            ("Directory sizes", "du -sh * | sort -hr | head -10"),
            ("Recently modified", "find . -type f -mtime -1 2>/dev/null | head -20"),
        ],
    ),
];

const MACOS: Table = &[
    (
        "System information",
        &[
            ("System info", "system_profiler SPSoftwareDataType"),
            ("Memory usage", "vm_stat"),
            ("Disk space", "df -h"),
            ("CPU info", "sysctl -n machdep.cpu.brand_string"),
            ("Load average", "uptime"),
            ("Battery", "pmset -g batt"),
        ],
    ),
    (
        "Network",
        &[
            ("Ping baidu.com", "ping -c 4 www.baidu.com"),
            ("Ping google.com", "ping -c 4 www.google.com"),
            ("Interfaces", "ifconfig"),
            ("Connections", "netstat -an"),
            ("Routing table", "netstat -nr"),
            ("Hardware ports", "networksetup -listallhardwareports"),
        ],
    ),
    (
        "Processes",
        &[
            ("Process list", "ps aux | head -25"),
            ("Top snapshot", "top -l 1 | head -20"),
            ("Ports in use", "lsof -i -P"),
            ("Launch agents", "launchctl list | head -25"),
            ("Disk IO", "iostat"),
            ("Temperatures", "sudo powermetrics --samplers smc | head -20"),
        ],
    ),
    (
        "Files",
        &[
            ("Open Finder here", "open ."),
            ("Current directory", "ls -lah"),
            ("Largest entries", "du -h -d 1 | sort -hr | head -10"),
            ("Home directory", "open ~"),
            ("Downloads", "open ~/Downloads"),
            ("Empty trash", "rm -rf ~/.Trash/*"),
        ],
    ),
];

pub fn for_platform(platform: Platform) -> Vec<PresetGroup> {
    let table = match platform {
        Platform::Windows => WINDOWS,
        Platform::Linux => LINUX,
        Platform::Macos => MACOS,
    };

    table
        .iter()
        .map(|(title, commands)| PresetGroup {
            title: *title,
            commands: commands
                .iter()
                .map(|(name, cmd)| CommandDef::new(*name, *cmd))
                .collect(),
        })
        .collect()
}

/// Look up a preset by display name (case-insensitive).
pub fn find(platform: Platform, name: &str) -> Option<CommandDef> {
    for_platform(platform)
        .into_iter()
        .flat_map(|g| g.commands)
        .find(|c| c.name.eq_ignore_ascii_case(name))
}
