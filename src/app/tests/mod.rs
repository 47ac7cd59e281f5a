mod sync_flows;
