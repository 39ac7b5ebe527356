pub mod csv;
pub mod pcap;
