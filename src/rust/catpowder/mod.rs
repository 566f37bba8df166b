// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use ::cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux;
        pub use self::linux::{
            ifaddr::{
                get_ifindex,
                get_link_addr,
            },
            LinuxRawLayer,
        };
    }
}
