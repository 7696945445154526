//! Request codes identifying one lookup category each.

/// Name-service database a request code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Database {
    /// Mail aliases.
    Alias,
    /// Ethernet address mappings.
    Ether,
    /// Groups.
    Group,
    /// Hosts.
    Host,
    /// Netgroups.
    Netgroup,
    /// Networks.
    Network,
    /// User accounts.
    Passwd,
    /// IP protocols.
    Protocol,
    /// RPC programs.
    Rpc,
    /// Network services.
    Service,
    /// Shadow password entries.
    Shadow,
}

/// Key fields a request code carries in its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A single name string.
    Name,
    /// A single `i32` (uid, gid, protocol or RPC number).
    Number,
    /// A member name string (group membership lookups).
    Member,
    /// An address (`i32` family, length-prefixed bytes).
    Address,
    /// A six byte Ethernet address.
    Ether,
    /// A service name string followed by a protocol string (empty for any).
    ServiceName,
    /// A port `i32` followed by a protocol string (empty for any).
    ServiceNumber,
    /// No key: enumerate every entry.
    Enumerate,
}

macro_rules! define_request_codes {
    ( $( $(#[$meta:meta])* $variant:ident = $code:literal, $name:literal, $database:ident, $key:ident; )* ) => {
        /// Numeric request code sent at the start of every request frame.
        ///
        /// Client and daemon share this single mapping.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum RequestCode {
            $( $(#[$meta])* $variant, )*
        }

        impl RequestCode {
            /// Every defined request code.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )* ];

            /// Decodes a raw code. Returns `None` for unknown values.
            #[must_use]
            pub const fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Raw wire value.
            #[must_use]
            pub const fn code(self) -> i32 {
                match self {
                    $( Self::$variant => $code, )*
                }
            }

            /// Stable name for logs.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Database the lookup runs against.
            #[must_use]
            pub const fn database(self) -> Database {
                match self {
                    $( Self::$variant => Database::$database, )*
                }
            }

            /// Key fields the request body carries.
            #[must_use]
            pub const fn key(self) -> KeyKind {
                match self {
                    $( Self::$variant => KeyKind::$key, )*
                }
            }
        }
    };
}

define_request_codes! {
    /// Alias by name.
    AliasByName = 4001, "alias_byname", Alias, Name;
    /// All aliases.
    AliasAll = 4002, "alias_all", Alias, Enumerate;
    /// Ethernet entry by host name.
    EtherByName = 3001, "ether_byname", Ether, Name;
    /// Ethernet entry by hardware address.
    EtherByEther = 3002, "ether_byether", Ether, Ether;
    /// All Ethernet entries.
    EtherAll = 3005, "ether_all", Ether, Enumerate;
    /// Group by name.
    GroupByName = 5001, "group_byname", Group, Name;
    /// Group by gid.
    GroupByGid = 5002, "group_bygid", Group, Number;
    /// Groups a user is a member of.
    GroupByMember = 5003, "group_bymember", Group, Member;
    /// All groups.
    GroupAll = 5004, "group_all", Group, Enumerate;
    /// Host by name.
    HostByName = 6001, "host_byname", Host, Name;
    /// Host by address.
    HostByAddr = 6002, "host_byaddr", Host, Address;
    /// All hosts.
    HostAll = 6005, "host_all", Host, Enumerate;
    /// Netgroup by name.
    NetgroupByName = 12001, "netgroup_byname", Netgroup, Name;
    /// Network by name.
    NetworkByName = 8001, "network_byname", Network, Name;
    /// Network by address.
    NetworkByAddr = 8002, "network_byaddr", Network, Address;
    /// All networks.
    NetworkAll = 8005, "network_all", Network, Enumerate;
    /// Account by name.
    PasswdByName = 1001, "passwd_byname", Passwd, Name;
    /// Account by uid.
    PasswdByUid = 1002, "passwd_byuid", Passwd, Number;
    /// All accounts.
    PasswdAll = 1004, "passwd_all", Passwd, Enumerate;
    /// Protocol by name.
    ProtocolByName = 9001, "protocol_byname", Protocol, Name;
    /// Protocol by number.
    ProtocolByNumber = 9002, "protocol_bynumber", Protocol, Number;
    /// All protocols.
    ProtocolAll = 9003, "protocol_all", Protocol, Enumerate;
    /// RPC program by name.
    RpcByName = 10001, "rpc_byname", Rpc, Name;
    /// RPC program by number.
    RpcByNumber = 10002, "rpc_bynumber", Rpc, Number;
    /// All RPC programs.
    RpcAll = 10003, "rpc_all", Rpc, Enumerate;
    /// Service by name and protocol.
    ServiceByName = 11001, "service_byname", Service, ServiceName;
    /// Service by port and protocol.
    ServiceByNumber = 11002, "service_bynumber", Service, ServiceNumber;
    /// All services.
    ServiceAll = 11005, "service_all", Service, Enumerate;
    /// Shadow entry by name.
    ShadowByName = 2001, "shadow_byname", Shadow, Name;
    /// All shadow entries.
    ShadowAll = 2005, "shadow_all", Shadow, Enumerate;
}

impl std::fmt::Display for RequestCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}
